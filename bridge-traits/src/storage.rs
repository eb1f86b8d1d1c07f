//! Persisted Preferences Abstraction
//!
//! The core owns exactly one piece of durable state: whether the user has
//! already been shown the health permission prompt on this install. It is
//! kept in the host's key-value preferences store so it survives restarts.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// Abstracts platform-specific preferences storage:
/// - iOS: UserDefaults
/// - Android: SharedPreferences / DataStore
/// - Desktop: SQLite-backed store from `bridge-desktop`
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn mark_asked(store: &dyn SettingsStore) -> Result<()> {
///     store.set_bool("health.permissions.asked", true).await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;
}
