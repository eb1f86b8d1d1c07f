//! # Category Schemas
//!
//! Each category declares which vendor data type it reads, which properties
//! it selects, how a raw [`StoreRecord`] is renamed and typed into a
//! [`NormalizedRecord`], and (for time-bucketed categories) which aggregate
//! columns it requests per bucket.

use bridge_traits::health::{AggregateColumn, StoreRecord, StoreValue};

use crate::types::{Category, FieldValue, NormalizedRecord};

pub mod exercise;
pub mod heart_rate;
pub mod nutrition;
pub mod sleep;
pub mod step_count;

/// Target type of a normalized field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Float,
    Text,
}

/// `vendor property` → (`output name`, type)
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub property: &'static str,
    pub name: &'static str,
    pub kind: FieldKind,
}

pub(crate) const fn field(property: &'static str, name: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef {
        property,
        name,
        kind,
    }
}

/// Static description of one category's query and mapping.
pub struct CategorySchema {
    pub data_type: &'static str,
    pub fields: &'static [FieldDef],
    /// Category-specific derived fields (display names, durations)
    pub enrich: fn(&StoreRecord, &mut NormalizedRecord),
    /// Per-bucket aggregate columns; `None` for categories that are never bucketed
    pub aggregates: Option<fn() -> Vec<AggregateColumn>>,
}

impl CategorySchema {
    /// Properties to select in a read query.
    pub fn properties(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.property.to_string()).collect()
    }

    /// Rename and type `record` according to the field table, then add
    /// derived fields. Absent or untypeable properties are left out.
    pub fn normalize(&self, record: &StoreRecord) -> NormalizedRecord {
        let mut normalized = NormalizedRecord::new();
        for def in self.fields {
            if let Some(value) = record.get(def.property).and_then(|v| convert(v, def.kind)) {
                normalized.insert(def.name.to_string(), value);
            }
        }
        (self.enrich)(record, &mut normalized);
        normalized
    }
}

impl Category {
    pub fn schema(self) -> &'static CategorySchema {
        match self {
            Category::Exercise => &exercise::SCHEMA,
            Category::HeartRate => &heart_rate::SCHEMA,
            Category::Sleep => &sleep::SCHEMA,
            Category::StepCount => &step_count::SCHEMA,
            Category::Nutrition => &nutrition::SCHEMA,
        }
    }

    pub fn is_bucketable(self) -> bool {
        self.schema().aggregates.is_some()
    }
}

fn convert(value: &StoreValue, kind: FieldKind) -> Option<FieldValue> {
    match kind {
        FieldKind::Int => value
            .as_i64()
            .or_else(|| value.as_f64().map(|v| v.round() as i64))
            .map(FieldValue::Int),
        FieldKind::Float => value.as_f64().map(FieldValue::Float),
        FieldKind::Text => match value {
            StoreValue::Text(text) => Some(FieldValue::Text(text.clone())),
            StoreValue::Int(v) => Some(FieldValue::Text(v.to_string())),
            StoreValue::Float(v) => Some(FieldValue::Text(v.to_string())),
        },
    }
}

/// Integer code stored under `property`, if present.
pub(crate) fn code(record: &StoreRecord, property: &str) -> Option<i64> {
    record.get(property).and_then(StoreValue::as_i64)
}
