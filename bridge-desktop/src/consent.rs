//! Scripted consent prompt host.
//!
//! Desktop has no vendor consent sheet. [`ScriptedConsentHost`] answers each
//! prompt from a queue of scripted user decisions and records what it was
//! asked, so callers can check how often and for what the core prompted.
//! When attached to an [`InMemoryHealthStore`] it writes granted keys back to
//! the store's registry, like the real sheet does.

use async_trait::async_trait;
use bridge_traits::{
    consent::PermissionUiHost,
    error::{BridgeError, Result},
    health::PermissionKey,
};
use core_async::sync::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::info;

use crate::health_store::InMemoryHealthStore;

/// One scripted user reaction to a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentScript {
    GrantAll,
    DenyAll,
    /// Grant only these data types
    Grant(HashSet<String>),
    /// No foreground UI when the prompt is requested
    Unavailable,
}

pub struct ScriptedConsentHost {
    script: Mutex<VecDeque<ConsentScript>>,
    prompts: Mutex<Vec<Vec<PermissionKey>>>,
    store: Option<Arc<InMemoryHealthStore>>,
}

impl ScriptedConsentHost {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            store: None,
        }
    }

    /// Apply granted keys to `store`'s registry.
    pub fn applying_to(mut self, store: Arc<InMemoryHealthStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn then(mut self, step: ConsentScript) -> Self {
        self.script.get_mut().push_back(step);
        self
    }

    pub fn then_grant<I, S>(self, data_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.then(ConsentScript::Grant(
            data_types.into_iter().map(Into::into).collect(),
        ))
    }

    /// Key sets of every prompt shown so far.
    pub async fn prompts(&self) -> Vec<Vec<PermissionKey>> {
        self.prompts.lock().await.clone()
    }

    pub async fn prompt_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

impl Default for ScriptedConsentHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionUiHost for ScriptedConsentHost {
    async fn present_consent(&self, keys: &[PermissionKey]) -> Result<HashMap<PermissionKey, bool>> {
        // An exhausted script behaves like a user dismissing the sheet.
        let step = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or(ConsentScript::DenyAll);

        if step == ConsentScript::Unavailable {
            return Err(BridgeError::NotAvailable(
                "No foreground activity to host the consent prompt".to_string(),
            ));
        }
        self.prompts.lock().await.push(keys.to_vec());

        let decision: HashMap<PermissionKey, bool> = keys
            .iter()
            .map(|key| {
                let granted = match &step {
                    ConsentScript::GrantAll => true,
                    ConsentScript::Grant(types) => types.contains(&key.data_type),
                    ConsentScript::DenyAll | ConsentScript::Unavailable => false,
                };
                (key.clone(), granted)
            })
            .collect();

        if let Some(store) = &self.store {
            for (key, granted) in &decision {
                if *granted {
                    store.set_permission(key.clone(), true).await;
                }
            }
        }

        info!(
            asked = keys.len(),
            granted = decision.values().filter(|g| **g).count(),
            "Scripted consent answered"
        );
        Ok(decision)
    }
}
