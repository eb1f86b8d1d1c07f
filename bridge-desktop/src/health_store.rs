//! In-memory Health Store
//!
//! A fixture-backed [`HealthDataStore`] for desktop development and tests.
//! It behaves like the vendor store at the query surface:
//!
//! - reads filter on `start_time` in `[start, end)`, sort, and project
//! - aggregates bin rows into clock-aligned windows in the store's local
//!   offset and label each window with the requested pattern
//! - the permission registry answers per key, and reads of a data type
//!   without a read grant fail with `PermissionDenied`
//!
//! Failures can be injected per operation so callers can exercise their
//! error paths.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    health::{
        AggregateColumn, AggregateFunction, AggregateRequest, HealthDataStore, PermissionKey,
        ReadRequest, SortOrder, StoreRecord, StoreValue,
    },
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use core_async::sync::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use tracing::{debug, instrument, warn};

use crate::fixtures::HealthFixture;

#[derive(Default)]
struct Failures {
    connect: Option<String>,
    permissions: Option<String>,
    queries: HashMap<String, String>,
}

pub struct InMemoryHealthStore {
    records: RwLock<HashMap<String, Vec<StoreRecord>>>,
    grants: RwLock<HashMap<PermissionKey, bool>>,
    failures: RwLock<Failures>,
    connected: AtomicBool,
    offset: FixedOffset,
}

impl InMemoryHealthStore {
    /// Empty store in UTC.
    pub fn new() -> Self {
        Self::with_offset(Utc.fix())
    }

    /// Empty store whose local clock is `offset`.
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            grants: RwLock::new(HashMap::new()),
            failures: RwLock::new(Failures::default()),
            connected: AtomicBool::new(false),
            offset,
        }
    }

    /// Store seeded from a fixture.
    pub fn from_fixture(fixture: HealthFixture) -> Result<Self> {
        let offset = fixture.offset()?;
        let (records, grants) = fixture.into_parts();
        let store = Self::with_offset(offset);
        Ok(Self {
            records: RwLock::new(records),
            grants: RwLock::new(grants),
            ..store
        })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub async fn insert(&self, data_type: &str, record: StoreRecord) {
        self.records
            .write()
            .await
            .entry(data_type.to_string())
            .or_default()
            .push(record);
    }

    pub async fn insert_all<I>(&self, data_type: &str, records: I)
    where
        I: IntoIterator<Item = StoreRecord>,
    {
        self.records
            .write()
            .await
            .entry(data_type.to_string())
            .or_default()
            .extend(records);
    }

    pub async fn set_permission(&self, key: PermissionKey, granted: bool) {
        self.grants.write().await.insert(key, granted);
    }

    pub async fn grant_read(&self, data_type: &str) {
        self.set_permission(PermissionKey::read(data_type), true).await;
    }

    pub async fn fail_connect(&self, message: impl Into<String>) {
        self.failures.write().await.connect = Some(message.into());
    }

    pub async fn fail_permission_check(&self, message: impl Into<String>) {
        self.failures.write().await.permissions = Some(message.into());
    }

    /// Make every read and aggregate of `data_type` fail.
    pub async fn fail_queries(&self, data_type: &str, message: impl Into<String>) {
        self.failures
            .write()
            .await
            .queries
            .insert(data_type.to_string(), message.into());
    }

    pub async fn clear_failures(&self) {
        *self.failures.write().await = Failures::default();
    }

    async fn check_query(&self, data_type: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(BridgeError::ConnectionFailed(
                "Health store is not connected".to_string(),
            ));
        }
        if let Some(message) = self.failures.read().await.queries.get(data_type) {
            return Err(BridgeError::QueryFailed(message.clone()));
        }
        let granted = self
            .grants
            .read()
            .await
            .get(&PermissionKey::read(data_type))
            .copied()
            .unwrap_or(false);
        if !granted {
            return Err(BridgeError::PermissionDenied(format!(
                "No read permission for {}",
                data_type
            )));
        }
        Ok(())
    }

    /// Records of `data_type` whose start time is in `[start, end)`.
    async fn in_range(
        &self,
        data_type: &str,
        time_property: &str,
        start: i64,
        end: i64,
    ) -> Vec<StoreRecord> {
        self.records
            .read()
            .await
            .get(data_type)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.get(time_property)
                            .and_then(StoreValue::as_i64)
                            .map(|t| t >= start && t < end)
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start of the window holding `timestamp`, aligned in local time.
    /// `None` when the arithmetic leaves the i64 range.
    fn window_start(&self, timestamp: i64, width: i64) -> Option<i64> {
        let offset_ms = i64::from(self.offset.local_minus_utc()) * 1000;
        let local = timestamp.checked_add(offset_ms)?;
        (local - local.rem_euclid(width)).checked_sub(offset_ms)
    }
}

impl Default for InMemoryHealthStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthDataStore for InMemoryHealthStore {
    async fn connect(&self) -> Result<()> {
        if let Some(message) = &self.failures.read().await.connect {
            warn!(error = %message, "Refusing connection");
            return Err(BridgeError::ConnectionFailed(message.clone()));
        }
        self.connected.store(true, AtomicOrdering::SeqCst);
        debug!("Health store connected");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.connected.store(false, AtomicOrdering::SeqCst);
        debug!("Health store disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(AtomicOrdering::SeqCst)
    }

    #[instrument(skip(self, request), fields(data_type = %request.data_type))]
    async fn read(&self, request: ReadRequest) -> Result<Vec<StoreRecord>> {
        self.check_query(&request.data_type).await?;

        let mut rows = self
            .in_range(
                &request.data_type,
                bridge_traits::health::START_TIME_PROPERTY,
                request.start_time,
                request.end_time,
            )
            .await;

        rows.sort_by(|a, b| {
            let ordering = compare(a.get(&request.sort_property), b.get(&request.sort_property));
            match request.sort_order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        if !request.properties.is_empty() {
            let selected: HashSet<&str> = request.properties.iter().map(String::as_str).collect();
            for row in &mut rows {
                row.retain(|property, _| selected.contains(property.as_str()));
            }
        }

        debug!(rows = rows.len(), "Served read");
        Ok(rows)
    }

    #[instrument(skip(self, request), fields(data_type = %request.data_type))]
    async fn aggregate(&self, request: AggregateRequest) -> Result<Vec<StoreRecord>> {
        self.check_query(&request.data_type).await?;

        let group = &request.time_group;
        let width = group.width_millis();
        if width <= 0 {
            return Err(BridgeError::QueryFailed(format!(
                "Invalid time group width: {} ms",
                width
            )));
        }

        let rows = self
            .in_range(
                &request.data_type,
                &group.time_property,
                request.start_time,
                request.end_time,
            )
            .await;

        let mut windows: BTreeMap<i64, Vec<StoreRecord>> = BTreeMap::new();
        for row in rows {
            let Some(t) = row.get(&group.time_property).and_then(StoreValue::as_i64) else {
                continue;
            };
            match self.window_start(t, width) {
                Some(start) => windows.entry(start).or_default().push(row),
                None => warn!(timestamp = t, "Timestamp outside the window range, skipping"),
            }
        }

        let mut output = Vec::with_capacity(windows.len());
        for (start, members) in windows {
            let Some(instant) = DateTime::from_timestamp_millis(start) else {
                warn!(start, "Window start out of range, skipping");
                continue;
            };
            let mut label = String::new();
            write!(
                label,
                "{}",
                instant.with_timezone(&self.offset).format(&group.label_pattern)
            )
            .map_err(|_| {
                BridgeError::QueryFailed(format!(
                    "Invalid label pattern '{}'",
                    group.label_pattern
                ))
            })?;

            let mut record = StoreRecord::new();
            record.insert(group.label_alias.clone(), StoreValue::Text(label));
            for column in &request.columns {
                if let Some(value) = apply(column, &members) {
                    record.insert(column.alias.clone(), value);
                }
            }
            output.push(record);
        }

        if request.sort_order == SortOrder::Descending {
            output.reverse();
        }

        debug!(windows = output.len(), "Served aggregate");
        Ok(output)
    }

    async fn permission_status(
        &self,
        keys: &[PermissionKey],
    ) -> Result<HashMap<PermissionKey, bool>> {
        if !self.is_connected() {
            return Err(BridgeError::ConnectionFailed(
                "Health store is not connected".to_string(),
            ));
        }
        if let Some(message) = &self.failures.read().await.permissions {
            return Err(BridgeError::PermissionDenied(message.clone()));
        }

        let grants = self.grants.read().await;
        Ok(keys
            .iter()
            .map(|key| (key.clone(), grants.get(key).copied().unwrap_or(false)))
            .collect())
    }
}

fn compare(a: Option<&StoreValue>, b: Option<&StoreValue>) -> Ordering {
    match (a, b) {
        (Some(StoreValue::Text(a)), Some(StoreValue::Text(b))) => a.cmp(b),
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// One aggregate column over a window. `None` when no member carries a
/// numeric value for the property (the vendor store reports null).
fn apply(column: &AggregateColumn, members: &[StoreRecord]) -> Option<StoreValue> {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|row| row.get(&column.property).and_then(StoreValue::as_f64))
        .collect();

    if column.function == AggregateFunction::Count {
        return Some(StoreValue::Int(values.len() as i64));
    }
    if values.is_empty() {
        return None;
    }

    let value = match column.function {
        AggregateFunction::Sum => values.iter().sum(),
        AggregateFunction::Average => values.iter().sum::<f64>() / values.len() as f64,
        AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateFunction::Count => values.len() as f64,
    };
    Some(StoreValue::Float(value))
}
