//! Mock bridge doubles shared by unit tests.

use async_trait::async_trait;
use bridge_traits::{
    consent::PermissionUiHost,
    error::Result,
    health::{AggregateRequest, HealthDataStore, PermissionKey, ReadRequest, StoreRecord},
    storage::SettingsStore,
};
use mockall::mock;
use std::collections::HashMap;

mock! {
    pub Store {}

    #[async_trait]
    impl HealthDataStore for Store {
        async fn connect(&self) -> Result<()>;
        async fn disconnect(&self) -> Result<()>;
        fn is_connected(&self) -> bool;
        async fn read(&self, request: ReadRequest) -> Result<Vec<StoreRecord>>;
        async fn aggregate(&self, request: AggregateRequest) -> Result<Vec<StoreRecord>>;
        async fn permission_status(&self, keys: &[PermissionKey]) -> Result<HashMap<PermissionKey, bool>>;
    }
}

mock! {
    pub Settings {}

    #[async_trait]
    impl SettingsStore for Settings {
        async fn set_string(&self, key: &str, value: &str) -> Result<()>;
        async fn get_string(&self, key: &str) -> Result<Option<String>>;
        async fn set_bool(&self, key: &str, value: bool) -> Result<()>;
        async fn get_bool(&self, key: &str) -> Result<Option<bool>>;
        async fn set_i64(&self, key: &str, value: i64) -> Result<()>;
        async fn get_i64(&self, key: &str) -> Result<Option<i64>>;
        async fn delete(&self, key: &str) -> Result<()>;
        async fn has_key(&self, key: &str) -> Result<bool>;
        async fn list_keys(&self) -> Result<Vec<String>>;
    }
}

mock! {
    pub UiHost {}

    #[async_trait]
    impl PermissionUiHost for UiHost {
        async fn present_consent(&self, keys: &[PermissionKey]) -> Result<HashMap<PermissionKey, bool>>;
    }
}
