//! Step counts and their per-bucket totals.

use bridge_traits::health::{AggregateColumn, AggregateFunction, StoreRecord};

use super::{field, CategorySchema, FieldKind::*, FieldDef};
use crate::types::NormalizedRecord;

pub const DATA_TYPE: &str = "com.samsung.health.step_count";

static FIELDS: &[FieldDef] = &[
    field("datauuid", "id", Text),
    field("start_time", "start_time", Int),
    field("end_time", "end_time", Int),
    field("time_offset", "time_offset", Int),
    field("count", "count", Int),
    field("calorie", "calorie", Float),
    field("distance", "distance", Float),
    field("speed", "speed", Float),
];

pub static SCHEMA: CategorySchema = CategorySchema {
    data_type: DATA_TYPE,
    fields: FIELDS,
    enrich,
    aggregates: Some(aggregates),
};

fn enrich(_record: &StoreRecord, _normalized: &mut NormalizedRecord) {}

fn aggregates() -> Vec<AggregateColumn> {
    vec![
        AggregateColumn::new(AggregateFunction::Sum, "count", "count"),
        AggregateColumn::new(AggregateFunction::Sum, "calorie", "calorie"),
        AggregateColumn::new(AggregateFunction::Sum, "distance", "distance"),
        AggregateColumn::new(AggregateFunction::Average, "speed", "speed"),
    ]
}
