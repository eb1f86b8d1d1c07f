//! Permission Consent UI
//!
//! Presenting the vendor's consent sheet needs a live UI surface (an Android
//! `Activity`, an iOS view controller). The core never touches UI; it asks
//! the host through [`PermissionUiHost`] and gets the user's decision back.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{error::Result, health::PermissionKey};

/// Host surface able to show the store's permission consent prompt.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::consent::PermissionUiHost;
/// use bridge_traits::health::PermissionKey;
///
/// async fn ask(host: &dyn PermissionUiHost) -> Result<bool> {
///     let key = PermissionKey::read("com.samsung.health.sleep");
///     let decision = host.present_consent(&[key.clone()]).await?;
///     Ok(decision.get(&key).copied().unwrap_or(false))
/// }
/// ```
#[async_trait]
pub trait PermissionUiHost: Send + Sync {
    /// Show the consent prompt for `keys` and resolve once the user dismisses it.
    ///
    /// The returned map carries the post-prompt state of each key; keys that
    /// are missing are treated as denied. Fails with
    /// [`BridgeError::NotAvailable`](crate::BridgeError::NotAvailable) when no
    /// foreground UI is attached.
    async fn present_consent(&self, keys: &[PermissionKey]) -> Result<HashMap<PermissionKey, bool>>;
}
