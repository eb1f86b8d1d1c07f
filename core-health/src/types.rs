//! # Health Data Model
//!
//! Category-agnostic shapes the core hands back to the application shell.
//! The vendor store owns the underlying records; everything here is a
//! read-only, per-request reshaping of them.

use bridge_traits::health::{AccessType, PermissionKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::bucket::BucketedSample;
use crate::error::{HealthError, Result};

// =============================================================================
// TimeRange
// =============================================================================

/// Query window in epoch milliseconds, interpreted by the store's own
/// local-offset convention.
///
/// Construction enforces `start <= end`, so every fetch that takes a
/// `TimeRange` is already validated before a query can be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: i64,
    end: i64,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Result<Self> {
        if start > end {
            return Err(HealthError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }
}

// =============================================================================
// Category / Capability
// =============================================================================

/// One of the five health data categories the plugin exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Exercise,
    HeartRate,
    Sleep,
    StepCount,
    Nutrition,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Exercise,
        Category::HeartRate,
        Category::Sleep,
        Category::StepCount,
        Category::Nutrition,
    ];

    /// Key used in combined responses and `denied_permissions` lists.
    pub fn name(self) -> &'static str {
        match self {
            Category::Exercise => "exercise",
            Category::HeartRate => "heart_rate",
            Category::Sleep => "sleep",
            Category::StepCount => "step_count",
            Category::Nutrition => "nutrition",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Vendor data type the category is read from.
    pub fn data_type(self) -> &'static str {
        self.schema().data_type
    }

    pub fn from_data_type(data_type: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.data_type() == data_type)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Access mode a capability asks for. The plugin only ever reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    Read,
}

/// A (category, access mode) pair requiring user consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capability {
    pub category: Category,
    pub access: AccessMode,
}

impl Capability {
    pub fn read(category: Category) -> Self {
        Self {
            category,
            access: AccessMode::Read,
        }
    }

    /// Read capabilities for every category.
    pub fn all_read() -> BTreeSet<Capability> {
        Category::ALL.into_iter().map(Capability::read).collect()
    }

    pub fn permission_key(&self) -> PermissionKey {
        match self.access {
            AccessMode::Read => PermissionKey::read(self.category.data_type()),
        }
    }

    pub fn from_permission_key(key: &PermissionKey) -> Option<Self> {
        let category = Category::from_data_type(&key.data_type)?;
        match key.access {
            AccessType::Read => Some(Capability::read(category)),
            AccessType::Write => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category.name())
    }
}

// =============================================================================
// Normalized records
// =============================================================================

/// Scalar value of a normalized field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One vendor record reshaped into field name → scalar.
pub type NormalizedRecord = BTreeMap<String, FieldValue>;

/// The sequence returned for one category.
///
/// Serializes as a bare JSON array either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategoryData {
    Records(Vec<NormalizedRecord>),
    Buckets(Vec<BucketedSample>),
}

impl CategoryData {
    pub fn len(&self) -> usize {
        match self {
            CategoryData::Records(records) => records.len(),
            CategoryData::Buckets(samples) => samples.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn records(&self) -> Option<&[NormalizedRecord]> {
        match self {
            CategoryData::Records(records) => Some(records),
            CategoryData::Buckets(_) => None,
        }
    }

    pub fn buckets(&self) -> Option<&[BucketedSample]> {
        match self {
            CategoryData::Buckets(samples) => Some(samples),
            CategoryData::Records(_) => None,
        }
    }
}

// =============================================================================
// AggregateResponse
// =============================================================================

/// Combined result of one multi-category request.
///
/// Every planned category has an entry; denied (and, under the degrade
/// policy, failed) categories carry an empty sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResponse {
    pub categories: BTreeMap<Category, CategoryData>,
    /// Categories whose read capability was not granted
    pub denied: BTreeSet<Category>,
    /// Categories whose fetch failed, with the failure message
    pub failed: BTreeMap<Category, String>,
}

impl AggregateResponse {
    pub fn get(&self, category: Category) -> Option<&CategoryData> {
        self.categories.get(&category)
    }

    /// Names of denied categories, in category order.
    pub fn denied_names(&self) -> Vec<&'static str> {
        self.denied.iter().map(|c| c.name()).collect()
    }

    pub fn total_items(&self) -> usize {
        self.categories.values().map(CategoryData::len).sum()
    }
}
