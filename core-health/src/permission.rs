//! # Permission Gate
//!
//! Splits a requested capability set into granted and denied halves by
//! asking the store's permission registry, and optionally shows the consent
//! prompt once per install.
//!
//! ## Persistence
//!
//! The "already asked" flag lives in the host settings store under
//! [`ASKED_KEY`]. It is only written after a prompt that still left
//! something denied, so a user who grants everything is never marked.
//!
//! ## Failure handling
//!
//! A registry failure fails the evaluation; it never yields a partially
//! granted partition.

use bridge_traits::{
    consent::PermissionUiHost,
    health::{HealthDataStore, PermissionKey},
    storage::SettingsStore,
    time::{Clock, SystemClock},
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{HealthError, Result};
use crate::types::Capability;

/// Settings key for the once-per-install prompt flag.
pub const ASKED_KEY: &str = "health.permissions.asked";

/// Settings key holding when the prompt was last shown (epoch millis).
pub const ASKED_AT_KEY: &str = "health.permissions.asked_at";

/// Outcome of one permission evaluation.
///
/// `granted` and `denied` are disjoint and together equal the required set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionPartition {
    pub granted: BTreeSet<Capability>,
    pub denied: BTreeSet<Capability>,
}

impl PermissionPartition {
    /// Partition `required` using a registry decision. Capabilities absent
    /// from `decision` count as denied.
    pub fn from_decision(
        required: &BTreeSet<Capability>,
        decision: &HashMap<PermissionKey, bool>,
    ) -> Self {
        let (granted, denied) = required
            .iter()
            .copied()
            .partition(|capability| {
                decision
                    .get(&capability.permission_key())
                    .copied()
                    .unwrap_or(false)
            });
        Self { granted, denied }
    }

    /// Everything granted.
    pub fn all_granted(required: &BTreeSet<Capability>) -> Self {
        Self {
            granted: required.clone(),
            denied: BTreeSet::new(),
        }
    }

    pub fn is_granted(&self, capability: &Capability) -> bool {
        self.granted.contains(capability)
    }

    pub fn has_denied(&self) -> bool {
        !self.denied.is_empty()
    }
}

pub struct PermissionGate {
    store: Arc<dyn HealthDataStore>,
    settings: Arc<dyn SettingsStore>,
    ui_host: Option<Arc<dyn PermissionUiHost>>,
    clock: Arc<dyn Clock>,
}

impl PermissionGate {
    pub fn new(
        store: Arc<dyn HealthDataStore>,
        settings: Arc<dyn SettingsStore>,
        ui_host: Option<Arc<dyn PermissionUiHost>>,
    ) -> Self {
        Self {
            store,
            settings,
            ui_host,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_ui_host(&self) -> bool {
        self.ui_host.is_some()
    }

    /// Query the registry for `required` without prompting.
    #[instrument(skip(self, required), fields(required = required.len()))]
    pub async fn evaluate(&self, required: &BTreeSet<Capability>) -> Result<PermissionPartition> {
        if required.is_empty() {
            return Ok(PermissionPartition::default());
        }

        let keys = permission_keys(required);
        let decision = self
            .store
            .permission_status(&keys)
            .await
            .map_err(|e| HealthError::Permission(e.to_string()))?;

        let partition = PermissionPartition::from_decision(required, &decision);
        debug!(
            granted = partition.granted.len(),
            denied = partition.denied.len(),
            "Permission status evaluated"
        );
        Ok(partition)
    }

    /// Show the consent prompt for `denied` and return the post-prompt
    /// partition of those capabilities.
    ///
    /// Marks the install as asked when anything is still denied afterwards.
    #[instrument(skip(self, denied), fields(denied = denied.len()))]
    pub async fn request_interactive(
        &self,
        denied: &BTreeSet<Capability>,
    ) -> Result<PermissionPartition> {
        let host = self.ui_host.as_ref().ok_or(HealthError::UiUnavailable)?;
        if denied.is_empty() {
            return Ok(PermissionPartition::default());
        }

        let keys = permission_keys(denied);
        let decision = host.present_consent(&keys).await.map_err(|e| match e {
            bridge_traits::BridgeError::NotAvailable(_) => HealthError::UiUnavailable,
            other => HealthError::Permission(other.to_string()),
        })?;

        let partition = PermissionPartition::from_decision(denied, &decision);
        info!(
            granted = partition.granted.len(),
            still_denied = partition.denied.len(),
            "Consent prompt resolved"
        );

        if partition.has_denied() {
            self.mark_asked().await?;
        }
        Ok(partition)
    }

    /// Whether the prompt has already been shown on this install.
    pub async fn has_asked(&self) -> Result<bool> {
        self.settings
            .get_bool(ASKED_KEY)
            .await
            .map(|flag| flag.unwrap_or(false))
            .map_err(|e| HealthError::Settings(e.to_string()))
    }

    /// Forget the asked flag so the next request may prompt again.
    pub async fn reset_asked(&self) -> Result<()> {
        for key in [ASKED_KEY, ASKED_AT_KEY] {
            self.settings
                .delete(key)
                .await
                .map_err(|e| HealthError::Settings(e.to_string()))?;
        }
        Ok(())
    }

    /// Evaluate `required`, prompting once for anything denied when `prompt`
    /// is set, the install has not been asked yet, and a UI host exists.
    pub async fn evaluate_with_prompt(
        &self,
        required: &BTreeSet<Capability>,
        prompt: bool,
    ) -> Result<PermissionPartition> {
        let partition = self.evaluate(required).await?;
        if !partition.has_denied() || !prompt || self.ui_host.is_none() {
            return Ok(partition);
        }
        if self.has_asked().await? {
            debug!("Permission prompt already shown on this install");
            return Ok(partition);
        }

        let prompted = match self.request_interactive(&partition.denied).await {
            Ok(prompted) => prompted,
            Err(HealthError::UiUnavailable) => {
                warn!("UI host unavailable, continuing with current grants");
                return Ok(partition);
            }
            Err(e) => return Err(e),
        };

        let mut granted = partition.granted;
        granted.extend(prompted.granted);
        Ok(PermissionPartition {
            granted,
            denied: prompted.denied,
        })
    }

    async fn mark_asked(&self) -> Result<()> {
        self.settings
            .set_bool(ASKED_KEY, true)
            .await
            .map_err(|e| HealthError::Settings(e.to_string()))?;
        self.settings
            .set_i64(ASKED_AT_KEY, self.clock.unix_timestamp_millis())
            .await
            .map_err(|e| HealthError::Settings(e.to_string()))
    }
}

fn permission_keys(capabilities: &BTreeSet<Capability>) -> Vec<PermissionKey> {
    capabilities.iter().map(Capability::permission_key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockSettings, MockStore, MockUiHost};
    use crate::types::Category;
    use bridge_traits::BridgeError;
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::predicate::eq;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        }
    }

    fn decision(granted: &[Category], denied: &[Category]) -> HashMap<PermissionKey, bool> {
        granted
            .iter()
            .map(|c| (Capability::read(*c).permission_key(), true))
            .chain(
                denied
                    .iter()
                    .map(|c| (Capability::read(*c).permission_key(), false)),
            )
            .collect()
    }

    fn set(categories: &[Category]) -> BTreeSet<Capability> {
        categories.iter().copied().map(Capability::read).collect()
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let required = Capability::all_read();
        let decision = decision(&[Category::StepCount, Category::Sleep], &[Category::Exercise]);

        let partition = PermissionPartition::from_decision(&required, &decision);

        assert!(partition.granted.is_disjoint(&partition.denied));
        let union: BTreeSet<_> = partition.granted.union(&partition.denied).copied().collect();
        assert_eq!(union, required);
        assert_eq!(partition.granted, set(&[Category::StepCount, Category::Sleep]));
        // heart_rate and nutrition are missing from the decision
        assert_eq!(partition.denied.len(), 3);
    }

    #[tokio::test]
    async fn test_registry_failure_fails_closed() {
        let mut store = MockStore::new();
        store
            .expect_permission_status()
            .returning(|_| Err(BridgeError::OperationFailed("registry offline".into())));

        let gate = PermissionGate::new(Arc::new(store), Arc::new(MockSettings::new()), None);
        let result = gate.evaluate(&Capability::all_read()).await;

        assert!(matches!(result, Err(HealthError::Permission(_))));
    }

    #[tokio::test]
    async fn test_request_interactive_without_host() {
        let gate = PermissionGate::new(
            Arc::new(MockStore::new()),
            Arc::new(MockSettings::new()),
            None,
        );
        let result = gate.request_interactive(&set(&[Category::Sleep])).await;
        assert!(matches!(result, Err(HealthError::UiUnavailable)));
    }

    #[tokio::test]
    async fn test_prompt_marks_install_when_still_denied() {
        let mut store = MockStore::new();
        store
            .expect_permission_status()
            .returning(|_| Ok(decision(&[Category::StepCount], &[Category::Sleep])));

        let mut host = MockUiHost::new();
        host.expect_present_consent()
            .withf(|keys| keys.len() == 1)
            .times(1)
            .returning(|_| Ok(decision(&[], &[Category::Sleep])));

        let mut settings = MockSettings::new();
        settings
            .expect_get_bool()
            .with(eq(ASKED_KEY))
            .returning(|_| Ok(None));
        settings
            .expect_set_bool()
            .with(eq(ASKED_KEY), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        settings
            .expect_set_i64()
            .with(eq(ASKED_AT_KEY), eq(1_700_000_000_000))
            .times(1)
            .returning(|_, _| Ok(()));

        let gate = PermissionGate::new(Arc::new(store), Arc::new(settings), Some(Arc::new(host)))
            .with_clock(Arc::new(FixedClock));

        let partition = gate
            .evaluate_with_prompt(&set(&[Category::StepCount, Category::Sleep]), true)
            .await
            .unwrap();

        assert_eq!(partition.granted, set(&[Category::StepCount]));
        assert_eq!(partition.denied, set(&[Category::Sleep]));
    }

    #[tokio::test]
    async fn test_prompt_grants_merge_into_partition() {
        let mut store = MockStore::new();
        store
            .expect_permission_status()
            .returning(|_| Ok(decision(&[Category::StepCount], &[Category::Sleep])));

        let mut host = MockUiHost::new();
        host.expect_present_consent()
            .returning(|_| Ok(decision(&[Category::Sleep], &[])));

        let mut settings = MockSettings::new();
        settings.expect_get_bool().returning(|_| Ok(Some(false)));
        settings.expect_set_bool().never();

        let gate = PermissionGate::new(Arc::new(store), Arc::new(settings), Some(Arc::new(host)));
        let partition = gate
            .evaluate_with_prompt(&set(&[Category::StepCount, Category::Sleep]), true)
            .await
            .unwrap();

        assert_eq!(partition.granted, set(&[Category::StepCount, Category::Sleep]));
        assert!(partition.denied.is_empty());
    }

    #[tokio::test]
    async fn test_no_prompt_once_asked() {
        let mut store = MockStore::new();
        store
            .expect_permission_status()
            .returning(|_| Ok(decision(&[], &[Category::Sleep])));

        let mut host = MockUiHost::new();
        host.expect_present_consent().never();

        let mut settings = MockSettings::new();
        settings.expect_get_bool().returning(|_| Ok(Some(true)));

        let gate = PermissionGate::new(Arc::new(store), Arc::new(settings), Some(Arc::new(host)));
        let partition = gate
            .evaluate_with_prompt(&set(&[Category::Sleep]), true)
            .await
            .unwrap();

        assert_eq!(partition.denied, set(&[Category::Sleep]));
    }

    #[tokio::test]
    async fn test_reset_asked_clears_flag_and_timestamp() {
        let mut settings = MockSettings::new();
        for key in [ASKED_KEY, ASKED_AT_KEY] {
            settings
                .expect_delete()
                .with(eq(key))
                .times(1)
                .returning(|_| Ok(()));
        }

        let gate = PermissionGate::new(Arc::new(MockStore::new()), Arc::new(settings), None);
        gate.reset_asked().await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_asked_surfaces_settings_failure() {
        let mut settings = MockSettings::new();
        settings
            .expect_delete()
            .returning(|_| Err(BridgeError::OperationFailed("disk full".into())));

        let gate = PermissionGate::new(Arc::new(MockStore::new()), Arc::new(settings), None);
        let result = gate.reset_asked().await;
        assert!(matches!(result, Err(HealthError::Settings(_))));
    }
}
