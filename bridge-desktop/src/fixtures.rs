//! JSON fixtures for [`InMemoryHealthStore`](crate::InMemoryHealthStore).
//!
//! ```json
//! {
//!   "offset_minutes": 540,
//!   "records": {
//!     "com.samsung.health.heart_rate": [
//!       { "start_time": 1704067200000, "heart_rate": 70.0 }
//!     ]
//!   },
//!   "read_grants": {
//!     "com.samsung.health.heart_rate": true
//!   }
//! }
//! ```

use bridge_traits::{
    error::{BridgeError, Result},
    health::{PermissionKey, StoreRecord},
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthFixture {
    /// Store-local offset, minutes east of UTC
    #[serde(default)]
    pub offset_minutes: i32,
    /// Data type → records
    #[serde(default)]
    pub records: HashMap<String, Vec<StoreRecord>>,
    /// Data type → whether read access is granted
    #[serde(default)]
    pub read_grants: HashMap<String, bool>,
}

impl HealthFixture {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid health fixture: {}", e)))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let fixture = Self::from_json(&json)?;
        debug!(
            path = ?path,
            data_types = fixture.records.len(),
            "Loaded health fixture"
        );
        Ok(fixture)
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        self.offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                BridgeError::OperationFailed(format!(
                    "Fixture offset of {} minutes is out of range",
                    self.offset_minutes
                ))
            })
    }

    pub(crate) fn into_parts(
        self,
    ) -> (HashMap<String, Vec<StoreRecord>>, HashMap<PermissionKey, bool>) {
        let grants = self
            .read_grants
            .into_iter()
            .map(|(data_type, granted)| (PermissionKey::read(data_type), granted))
            .collect();
        (self.records, grants)
    }
}
