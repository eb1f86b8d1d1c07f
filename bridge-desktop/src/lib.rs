//! # Desktop Bridge Implementations
//!
//! Implementations of the bridge traits for desktop development and tests
//! (macOS, Windows, Linux), where the vendor health SDK is not available.
//!
//! ## Overview
//!
//! - `SettingsStore` using SQLite-backed key-value store
//! - `HealthDataStore` as an in-memory store seeded from JSON fixtures
//! - `PermissionUiHost` answering prompts from a script
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{HealthFixture, InMemoryHealthStore, SqliteSettingsStore};
//!
//! let fixture = HealthFixture::load("fixtures/week.json").await?;
//! let store = Arc::new(InMemoryHealthStore::from_fixture(fixture)?);
//! let settings = Arc::new(SqliteSettingsStore::in_memory().await?);
//! ```

mod consent;
mod fixtures;
mod health_store;
mod settings;

pub use consent::{ConsentScript, ScriptedConsentHost};
pub use fixtures::HealthFixture;
pub use health_store::InMemoryHealthStore;
pub use settings::SqliteSettingsStore;
