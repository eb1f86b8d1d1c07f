//! Exercise sessions.

use bridge_traits::health::StoreRecord;

use super::{code, field, CategorySchema, FieldKind::*, FieldDef};
use crate::codes;
use crate::types::{FieldValue, NormalizedRecord};

pub const DATA_TYPE: &str = "com.samsung.health.exercise";

static FIELDS: &[FieldDef] = &[
    field("datauuid", "id", Text),
    field("start_time", "start_time", Int),
    field("end_time", "end_time", Int),
    field("time_offset", "time_offset", Int),
    field("exercise_type", "exercise_type", Int),
    field("duration", "duration", Int),
    field("calorie", "calorie", Float),
    field("distance", "distance", Float),
    field("count", "count", Int),
    field("max_heart_rate", "max_heart_rate", Float),
    field("mean_heart_rate", "mean_heart_rate", Float),
    field("min_heart_rate", "min_heart_rate", Float),
    field("max_speed", "max_speed", Float),
    field("mean_speed", "mean_speed", Float),
];

pub static SCHEMA: CategorySchema = CategorySchema {
    data_type: DATA_TYPE,
    fields: FIELDS,
    enrich,
    aggregates: None,
};

fn enrich(record: &StoreRecord, normalized: &mut NormalizedRecord) {
    let name = code(record, "exercise_type")
        .map(codes::exercise_name)
        .unwrap_or(codes::UNKNOWN);
    normalized.insert("exercise_name".into(), FieldValue::from(name));
}
