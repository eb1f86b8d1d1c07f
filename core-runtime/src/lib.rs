//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the health data core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the domain and service
//! crates depend on. It establishes the logging conventions and the
//! fail-fast configuration that wires host bridges into the core.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{FailurePolicy, HealthConfig, HealthConfigBuilder};
pub use error::{Error, Result};
