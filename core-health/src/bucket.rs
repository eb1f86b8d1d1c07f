//! # Bucketed Time-Series Reducer
//!
//! Turns the rows of a time-grouped aggregate query into [`BucketedSample`]s.
//!
//! The store labels each window with a textual timestamp written in its own
//! local offset. [`BucketFormat`] is the single source of truth for that
//! label: the fetcher puts its pattern into the request, and the reducer
//! parses each returned label with the same pattern and offset. Rows whose
//! label does not parse are dropped and logged; they never fail the request.
//!
//! The reducer keeps the store's row order and passes duplicate labels
//! through unmerged.

use bridge_traits::health::{StoreRecord, StoreValue};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use tracing::{debug, warn};

use crate::error::{HealthError, Result};

/// Column the store writes bucket labels to.
pub const DEFAULT_LABEL_COLUMN: &str = "binning_time";

/// Minute-resolution label pattern used for minutely groupings.
pub const MINUTE_PATTERN: &str = "%Y-%m-%d %H:%M";

/// One fixed-width window with its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedSample {
    /// Window start, epoch millis
    pub bucket_start: i64,
    /// Label exactly as the store produced it
    pub bucket_label: String,
    /// Aggregate alias → value
    pub aggregates: BTreeMap<String, f64>,
}

impl BucketedSample {
    pub fn aggregate(&self, name: &str) -> Option<f64> {
        self.aggregates.get(name).copied()
    }
}

/// Label column, pattern and offset shared by request and reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketFormat {
    label_column: String,
    pattern: String,
    offset: FixedOffset,
}

impl BucketFormat {
    pub fn new(label_column: impl Into<String>, pattern: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            label_column: label_column.into(),
            pattern: pattern.into(),
            offset,
        }
    }

    /// Minute-resolution labels in the store's offset, given in minutes east of UTC.
    pub fn minutely(offset_minutes: i32) -> Result<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(HealthError::InvalidOffset(offset_minutes))?;
        Ok(Self::new(DEFAULT_LABEL_COLUMN, MINUTE_PATTERN, offset))
    }

    pub fn label_column(&self) -> &str {
        &self.label_column
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Label for the window starting at `epoch_millis`.
    ///
    /// Returns `None` for timestamps chrono cannot represent and for
    /// patterns with invalid format items.
    pub fn format_label(&self, epoch_millis: i64) -> Option<String> {
        let instant = DateTime::from_timestamp_millis(epoch_millis)?;
        let mut label = String::new();
        write!(label, "{}", instant.with_timezone(&self.offset).format(&self.pattern)).ok()?;
        Some(label)
    }

    /// Parse a store label back into the window start.
    pub fn parse_label(&self, label: &str) -> Result<i64> {
        let naive = NaiveDateTime::parse_from_str(label, &self.pattern).map_err(|e| {
            HealthError::LabelParse {
                label: label.to_string(),
                reason: e.to_string(),
            }
        })?;

        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| HealthError::LabelParse {
                label: label.to_string(),
                reason: "ambiguous local time".to_string(),
            })
    }
}

impl Default for BucketFormat {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_COLUMN, MINUTE_PATTERN, Utc.fix())
    }
}

/// Reduce aggregate rows into samples, in row order.
///
/// Every numeric column other than the label becomes an aggregate. Rows
/// without a parseable text label are skipped.
pub fn reduce(rows: Vec<StoreRecord>, format: &BucketFormat) -> Vec<BucketedSample> {
    let total = rows.len();
    let mut samples = Vec::with_capacity(total);

    for mut row in rows {
        let label = match row.remove(format.label_column()) {
            Some(StoreValue::Text(label)) => label,
            other => {
                warn!(label = ?other, "Dropping bucket row without a text label");
                continue;
            }
        };

        let bucket_start = match format.parse_label(&label) {
            Ok(start) => start,
            Err(e) => {
                warn!(label = %label, error = %e, "Dropping bucket row with unparseable label");
                continue;
            }
        };

        let aggregates = row
            .into_iter()
            .filter_map(|(name, value)| value.as_f64().map(|v| (name, v)))
            .collect();

        samples.push(BucketedSample {
            bucket_start,
            bucket_label: label,
            aggregates,
        });
    }

    let dropped = total - samples.len();
    debug!(rows = total, dropped, "Reduced bucket rows");

    samples
}
