//! # Core Configuration Module
//!
//! Provides configuration management for the health data core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `HealthConfig` holding the host bridges and the tunables of the
//! aggregation pipeline. It enforces fail-fast validation so a missing bridge
//! is reported at startup, not on the first bridge call.
//!
//! ## Required Dependencies
//!
//! - `HealthDataStore` - the vendor health store session
//! - `SettingsStore` - persists the permission prompt flag
//!
//! ## Optional Dependencies
//!
//! - `PermissionUiHost` - consent prompt surface; without it the core never
//!   prompts and interactive requests report the UI as unavailable
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{FailurePolicy, HealthConfig};
//! use std::time::Duration;
//!
//! let config = HealthConfig::builder()
//!     .health_store(Arc::new(store))
//!     .settings_store(Arc::new(settings))
//!     .ui_host(Arc::new(activity_host))
//!     .query_timeout(Some(Duration::from_secs(10)))
//!     .failure_policy(FailurePolicy::Degrade)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::HealthConfig;
//!
//! // Missing bridges fail with an actionable message
//! let config = HealthConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HealthDataStore, PermissionUiHost, SettingsStore};
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for one multi-category request.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default width of the heart-rate and step-count series buckets.
pub const DEFAULT_BUCKET_WIDTH: Duration = Duration::from_secs(5 * 60);

const MAX_BUCKET_WIDTH: Duration = Duration::from_secs(24 * 60 * 60);
const MAX_OFFSET_MINUTES: i32 = 18 * 60;

/// How a failed category fetch affects a combined request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failure fails the request; no partial data is returned
    #[default]
    FailFast,
    /// Failed categories become empty sequences and are reported by name
    Degrade,
}

/// Health core configuration.
///
/// Use [`HealthConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct HealthConfig {
    /// Vendor health store (required)
    pub health_store: Arc<dyn HealthDataStore>,

    /// Host preferences store (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Consent prompt surface (optional)
    pub ui_host: Option<Arc<dyn PermissionUiHost>>,

    /// Deadline for the whole fan-out/join; `None` disables it
    pub query_timeout: Option<Duration>,

    pub failure_policy: FailurePolicy,

    /// Width of bucketed series
    pub bucket_width: Duration,

    /// Store-local offset used to format and parse bucket labels, minutes east of UTC
    pub store_offset_minutes: i32,

    /// Prompt once per install when a combined request finds denied capabilities
    pub prompt_on_denied: bool,
}

impl std::fmt::Debug for HealthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthConfig")
            .field("health_store", &"<HealthDataStore>")
            .field("settings_store", &"<SettingsStore>")
            .field("ui_host", &self.ui_host.as_ref().map(|_| "<PermissionUiHost>"))
            .field("query_timeout", &self.query_timeout)
            .field("failure_policy", &self.failure_policy)
            .field("bucket_width", &self.bucket_width)
            .field("store_offset_minutes", &self.store_offset_minutes)
            .field("prompt_on_denied", &self.prompt_on_denied)
            .finish()
    }
}

impl HealthConfig {
    pub fn builder() -> HealthConfigBuilder {
        HealthConfigBuilder::default()
    }

    /// Validates the tunables.
    ///
    /// This checks:
    /// - Query timeout, when set, is non-zero
    /// - Bucket width is a positive whole number of minutes, at most one day
    /// - Store offset is within ±18 hours
    pub fn validate(&self) -> Result<()> {
        if self.query_timeout == Some(Duration::ZERO) {
            return Err(Error::Config(
                "Query timeout must be greater than zero. Use None to disable it.".to_string(),
            ));
        }

        let width = self.bucket_width;
        if width.is_zero() || width.subsec_nanos() != 0 || width.as_secs() % 60 != 0 {
            return Err(Error::Config(format!(
                "Bucket width must be a positive whole number of minutes, got {:?}",
                width
            )));
        }

        if width > MAX_BUCKET_WIDTH {
            return Err(Error::Config(format!(
                "Bucket width exceeds maximum of 24 hours, got {:?}",
                width
            )));
        }

        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&self.store_offset_minutes) {
            return Err(Error::Config(format!(
                "Store offset must be within ±18 hours, got {} minutes",
                self.store_offset_minutes
            )));
        }

        Ok(())
    }
}

fn health_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HealthDataStore".to_string(),
        message: "HealthDataStore implementation is required to read health data. \
                 Android: inject the vendor SDK store adapter. \
                 Desktop/tests: use bridge_desktop::InMemoryHealthStore."
            .to_string(),
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to remember the permission prompt. \
                 Android: inject SharedPreferences/DataStore. \
                 Desktop/tests: use bridge_desktop::SqliteSettingsStore."
            .to_string(),
    }
}

/// Builder for [`HealthConfig`].
pub struct HealthConfigBuilder {
    health_store: Option<Arc<dyn HealthDataStore>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    ui_host: Option<Arc<dyn PermissionUiHost>>,
    query_timeout: Option<Duration>,
    failure_policy: FailurePolicy,
    bucket_width: Duration,
    store_offset_minutes: i32,
    prompt_on_denied: bool,
}

impl Default for HealthConfigBuilder {
    fn default() -> Self {
        Self {
            health_store: None,
            settings_store: None,
            ui_host: None,
            query_timeout: Some(DEFAULT_QUERY_TIMEOUT),
            failure_policy: FailurePolicy::default(),
            bucket_width: DEFAULT_BUCKET_WIDTH,
            store_offset_minutes: 0,
            prompt_on_denied: true,
        }
    }
}

impl HealthConfigBuilder {
    pub fn health_store(mut self, store: Arc<dyn HealthDataStore>) -> Self {
        self.health_store = Some(store);
        self
    }

    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the consent prompt host (optional).
    ///
    /// Hosts attach this while a foreground activity exists.
    pub fn ui_host(mut self, host: Arc<dyn PermissionUiHost>) -> Self {
        self.ui_host = Some(host);
        self
    }

    /// Deadline for combined requests. `None` runs them unbounded.
    pub fn query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn bucket_width(mut self, width: Duration) -> Self {
        self.bucket_width = width;
        self
    }

    pub fn store_offset_minutes(mut self, minutes: i32) -> Self {
        self.store_offset_minutes = minutes;
        self
    }

    pub fn prompt_on_denied(mut self, enabled: bool) -> Self {
        self.prompt_on_denied = enabled;
        self
    }

    /// Builds the final `HealthConfig` instance.
    ///
    /// Returns [`Error::CapabilityMissing`] when a required bridge was not
    /// provided and [`Error::Config`] when a tunable is out of range.
    pub fn build(self) -> Result<HealthConfig> {
        let health_store = self.health_store.ok_or_else(health_store_missing_error)?;
        let settings_store = self.settings_store.ok_or_else(settings_store_missing_error)?;

        let config = HealthConfig {
            health_store,
            settings_store,
            ui_host: self.ui_host,
            query_timeout: self.query_timeout,
            failure_policy: self.failure_policy,
            bucket_width: self.bucket_width,
            store_offset_minutes: self.store_offset_minutes,
            prompt_on_denied: self.prompt_on_denied,
        };

        config.validate()?;

        Ok(config)
    }
}
