//! Health service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (vendor health
//! store, preferences, consent prompt) into the health core and answers the
//! plugin's named-method calls. Desktop builds enable the `desktop-shims`
//! feature, which depends on `bridge-desktop` for fixture-backed stores.

pub mod dispatcher;
pub mod error;
pub mod methods;
pub mod service;

pub use dispatcher::MethodDispatcher;
pub use error::{Result, ServiceError};
pub use methods::HealthMethod;
pub use service::HealthService;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::HealthFixture;

/// Convenience bootstrapper for desktop development hosts.
///
/// Serves `fixture` from an in-memory store and keeps preferences in SQLite,
/// at `settings_path` when given and in memory otherwise. No consent prompt
/// host is attached.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// use bridge_traits::MethodCall;
/// use core_service::{bootstrap_desktop, HealthFixture};
///
/// let fixture = HealthFixture::from_json(r#"{"offset_minutes": 540}"#)
///     .map_err(|e| core_service::ServiceError::InitializationFailed(e.to_string()))?;
/// let service = bootstrap_desktop(fixture, None).await?;
/// let reply = service.call(&MethodCall::bare("connect")).await?;
/// assert_eq!(reply["isConnect"], true);
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_desktop(
    fixture: HealthFixture,
    settings_path: Option<std::path::PathBuf>,
) -> Result<HealthService> {
    use bridge_desktop::{InMemoryHealthStore, SqliteSettingsStore};
    use std::sync::Arc;

    let offset_minutes = fixture.offset_minutes;
    let store = InMemoryHealthStore::from_fixture(fixture)
        .map_err(|err| ServiceError::InitializationFailed(err.to_string()))?;
    let settings = match settings_path {
        Some(path) => SqliteSettingsStore::new(path).await,
        None => SqliteSettingsStore::in_memory().await,
    }
    .map_err(|err| ServiceError::InitializationFailed(err.to_string()))?;

    let config = core_runtime::HealthConfig::builder()
        .health_store(Arc::new(store))
        .settings_store(Arc::new(settings))
        .store_offset_minutes(offset_minutes)
        .build()?;
    HealthService::new(config)
}
