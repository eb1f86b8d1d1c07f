//! Sleep stages.
//!
//! Read from the stage data type so each row carries both the stage and the
//! identifier of the sleep session it belongs to.

use bridge_traits::health::StoreRecord;

use super::{code, field, CategorySchema, FieldKind::*, FieldDef};
use crate::codes;
use crate::types::{FieldValue, NormalizedRecord};

pub const DATA_TYPE: &str = "com.samsung.health.sleep_stage";

static FIELDS: &[FieldDef] = &[
    field("datauuid", "id", Text),
    field("sleep_id", "sleep_id", Text),
    field("start_time", "start_time", Int),
    field("end_time", "end_time", Int),
    field("time_offset", "time_offset", Int),
    field("stage", "stage", Int),
];

pub static SCHEMA: CategorySchema = CategorySchema {
    data_type: DATA_TYPE,
    fields: FIELDS,
    enrich,
    aggregates: None,
};

fn enrich(record: &StoreRecord, normalized: &mut NormalizedRecord) {
    let name = code(record, "stage")
        .map(codes::sleep_stage_name)
        .unwrap_or(codes::UNKNOWN);
    normalized.insert("stage_name".into(), FieldValue::from(name));

    if let (Some(start), Some(end)) = (code(record, "start_time"), code(record, "end_time")) {
        if let Some(duration) = end.checked_sub(start).filter(|d| *d >= 0) {
            normalized.insert("duration".into(), FieldValue::Int(duration));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::health::StoreValue;

    #[test]
    fn test_stage_and_duration() {
        let raw: StoreRecord = [
            ("datauuid", StoreValue::from("st-1")),
            ("sleep_id", StoreValue::from("sl-9")),
            ("start_time", StoreValue::Int(0)),
            ("end_time", StoreValue::Int(1_200_000)),
            ("stage", StoreValue::Int(40003)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let normalized = SCHEMA.normalize(&raw);
        assert_eq!(normalized["stage_name"], FieldValue::from("Deep"));
        assert_eq!(normalized["duration"], FieldValue::Int(1_200_000));
        assert_eq!(normalized["sleep_id"], FieldValue::from("sl-9"));
    }

    #[test]
    fn test_unknown_stage() {
        let raw: StoreRecord = [("stage".to_string(), StoreValue::Int(12))].into_iter().collect();
        let normalized = SCHEMA.normalize(&raw);
        assert_eq!(normalized["stage_name"], FieldValue::from("Unknown"));
        assert!(!normalized.contains_key("duration"));
    }

    #[test]
    fn test_duration_skipped_when_span_overflows() {
        let raw: StoreRecord = [
            ("start_time".to_string(), StoreValue::Int(i64::MIN)),
            ("end_time".to_string(), StoreValue::Int(i64::MAX)),
        ]
        .into_iter()
        .collect();

        let normalized = SCHEMA.normalize(&raw);
        assert!(!normalized.contains_key("duration"));
        assert_eq!(normalized["start_time"], FieldValue::Int(i64::MIN));
    }
}
