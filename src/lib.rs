//! Workspace placeholder crate.
//!
//! This crate exists to expose feature flags that map to the workspace
//! crates. Host plugins can depend on `health-bridge-workspace` and enable
//! `desktop-shims` (fixture-backed stores for development) or `service`
//! (the façade alone, with host-provided bridges) without wiring each crate
//! individually.

#[cfg(any(feature = "service", feature = "desktop-shims"))]
pub use core_service::{HealthMethod, HealthService, MethodDispatcher, ServiceError};
