//! Settings Storage using SQLite
//!
//! Holds the host preferences the core reads and writes, which in practice is
//! the permission prompt flag and its timestamp. Values are stored as text
//! together with a type tag so a `get_bool` never silently reads an integer.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, error};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        value_type TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    )
"#;

/// SQLite-backed settings store
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) the settings database at `db_path`.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| db_error("connect to settings DB", e))?;

        let store = Self::with_pool(pool).await?;
        debug!(path = ?db_path, "Initialized settings store");
        Ok(store)
    }

    /// In-memory store for tests. A single pinned connection keeps the
    /// database alive for the lifetime of the store.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| db_error("parse in-memory URL", e))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| db_error("open in-memory settings DB", e))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| db_error("create settings table", e))?;
        Ok(Self { pool })
    }

    async fn set_value(&self, key: &str, value: &str, value_type: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, value_type, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_type = excluded.value_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(value_type)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("set setting", e))?;

        debug!(key, value_type, "Stored setting");
        Ok(())
    }

    async fn get_value(&self, key: &str, expected_type: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, value_type FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get setting", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let value: String = row.get(0);
        let value_type: String = row.get(1);
        if value_type != expected_type {
            error!(key, expected = expected_type, actual = %value_type, "Setting type mismatch");
            return Err(BridgeError::OperationFailed(format!(
                "Type mismatch for '{}': expected {}, got {}",
                key, expected_type, value_type
            )));
        }
        Ok(Some(value))
    }

    async fn get_parsed<T>(&self, key: &str, expected_type: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_value(key, expected_type)
            .await?
            .map(|raw| {
                raw.parse::<T>().map_err(|e| {
                    BridgeError::OperationFailed(format!("Parse error for '{}': {}", key, e))
                })
            })
            .transpose()
    }
}

fn db_error(action: &str, e: sqlx::Error) -> BridgeError {
    BridgeError::OperationFailed(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value, "string").await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key, "string").await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, &value.to_string(), "bool").await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_parsed(key, "bool").await
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_value(key, &value.to_string(), "i64").await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get_parsed(key, "i64").await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete setting", e))?;

        debug!(key, "Deleted setting");
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("check key", e))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list keys", e))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }
}
