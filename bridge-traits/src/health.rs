//! Health Data Store Abstraction
//!
//! The vendor health store is the proprietary on-device service that owns
//! every exercise, heart-rate, sleep, step and nutrition record. The core
//! never stores or indexes health data itself; it builds requests, hands them
//! to the host's implementation of [`HealthDataStore`], and reshapes whatever
//! comes back.
//!
//! The host adapter is responsible for:
//! - translating [`ReadRequest`] / [`AggregateRequest`] into the vendor query builder
//! - turning listener/callback completions into the returned futures
//! - converting vendor cursor rows into [`StoreRecord`] maps
//!
//! # Example
//!
//! ```ignore
//! use bridge_traits::health::{HealthDataStore, ReadRequest, SortOrder};
//!
//! async fn latest_sessions(store: &dyn HealthDataStore) -> Result<usize> {
//!     let request = ReadRequest::new("com.samsung.health.exercise", 0, 86_400_000)
//!         .with_properties(["start_time", "exercise_type"])
//!         .sorted_by("start_time", SortOrder::Descending);
//!     Ok(store.read(request).await?.len())
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// A single column value as returned by the vendor store.
///
/// Null columns are simply absent from the [`StoreRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StoreValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StoreValue::Int(v) => Some(*v),
            StoreValue::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StoreValue::Int(v) => Some(*v as f64),
            StoreValue::Float(v) => Some(*v),
            StoreValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoreValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for StoreValue {
    fn from(value: i64) -> Self {
        StoreValue::Int(value)
    }
}

impl From<f64> for StoreValue {
    fn from(value: f64) -> Self {
        StoreValue::Float(value)
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        StoreValue::Text(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        StoreValue::Text(value)
    }
}

/// One row returned by a read or aggregate query, keyed by property name
/// (or aggregate alias).
pub type StoreRecord = HashMap<String, StoreValue>;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Plain read of records whose `start_time` lies in `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    /// Vendor data type name (e.g. `com.samsung.health.exercise`)
    pub data_type: String,
    /// Inclusive lower bound, epoch millis
    pub start_time: i64,
    /// Exclusive upper bound, epoch millis
    pub end_time: i64,
    /// Properties to project; empty means all
    pub properties: Vec<String>,
    /// Property to sort on
    pub sort_property: String,
    pub sort_order: SortOrder,
}

impl ReadRequest {
    pub fn new(data_type: impl Into<String>, start_time: i64, end_time: i64) -> Self {
        Self {
            data_type: data_type.into(),
            start_time,
            end_time,
            properties: Vec::new(),
            sort_property: START_TIME_PROPERTY.to_string(),
            sort_order: SortOrder::Descending,
        }
    }

    pub fn with_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties = properties.into_iter().map(Into::into).collect();
        self
    }

    pub fn sorted_by(mut self, property: impl Into<String>, order: SortOrder) -> Self {
        self.sort_property = property.into();
        self.sort_order = order;
        self
    }
}

/// Aggregate function applied per time group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFunction {
    Sum,
    Average,
    Min,
    Max,
    Count,
}

/// `function(property) AS alias`
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateColumn {
    pub function: AggregateFunction,
    pub property: String,
    pub alias: String,
}

impl AggregateColumn {
    pub fn new(
        function: AggregateFunction,
        property: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            function,
            property: property.into(),
            alias: alias.into(),
        }
    }
}

/// Unit of a fixed-width time group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeGroupUnit {
    Minutely,
    Hourly,
    Daily,
}

impl TimeGroupUnit {
    pub fn millis(self) -> i64 {
        match self {
            TimeGroupUnit::Minutely => 60_000,
            TimeGroupUnit::Hourly => 3_600_000,
            TimeGroupUnit::Daily => 86_400_000,
        }
    }
}

/// Grouping of rows into fixed-width, clock-aligned windows.
///
/// The store emits one row per non-empty window. The textual window start is
/// written to the `label_alias` column using `label_pattern` (a
/// `chrono::format::strftime` pattern) in the store's local offset.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGroup {
    pub unit: TimeGroupUnit,
    pub amount: u32,
    /// Property holding each sample's timestamp
    pub time_property: String,
    /// Column that receives the window label
    pub label_alias: String,
    pub label_pattern: String,
}

impl TimeGroup {
    /// Window width in milliseconds.
    pub fn width_millis(&self) -> i64 {
        self.unit.millis() * i64::from(self.amount)
    }
}

/// Time-grouped aggregate query over `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRequest {
    pub data_type: String,
    pub start_time: i64,
    pub end_time: i64,
    pub columns: Vec<AggregateColumn>,
    pub time_group: TimeGroup,
    /// Ordering of the emitted windows by start
    pub sort_order: SortOrder,
}

/// Property every vendor data type uses for a record's start timestamp.
pub const START_TIME_PROPERTY: &str = "start_time";

/// Access mode of a permission key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessType {
    Read,
    Write,
}

/// A (data type, access mode) pair registered with the store's permission
/// manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    pub data_type: String,
    pub access: AccessType,
}

impl PermissionKey {
    pub fn read(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            access: AccessType::Read,
        }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = match self.access {
            AccessType::Read => "read",
            AccessType::Write => "write",
        };
        write!(f, "{}:{}", self.data_type, access)
    }
}

/// Vendor health data store.
///
/// Implementations must be safe for concurrent read-only use: the core
/// shares one handle across every fetch it runs in parallel.
#[async_trait]
pub trait HealthDataStore: Send + Sync {
    /// Open the session with the on-device service.
    ///
    /// Fails with [`BridgeError::ConnectionFailed`](crate::BridgeError::ConnectionFailed)
    /// when the service is missing, outdated, or refuses the connection.
    async fn connect(&self) -> Result<()>;

    /// Close the session. Idempotent.
    async fn disconnect(&self) -> Result<()>;

    /// Whether a session is currently open.
    fn is_connected(&self) -> bool;

    /// Run a plain read query.
    async fn read(&self, request: ReadRequest) -> Result<Vec<StoreRecord>>;

    /// Run a time-grouped aggregate query.
    async fn aggregate(&self, request: AggregateRequest) -> Result<Vec<StoreRecord>>;

    /// Look up the consent state of each key in the permission registry.
    ///
    /// Keys absent from the returned map are treated as not granted.
    async fn permission_status(&self, keys: &[PermissionKey]) -> Result<HashMap<PermissionKey, bool>>;
}
