//! Heart-rate samples and their per-bucket statistics.

use bridge_traits::health::{AggregateColumn, AggregateFunction, StoreRecord};

use super::{field, CategorySchema, FieldKind::*, FieldDef};
use crate::types::NormalizedRecord;

pub const DATA_TYPE: &str = "com.samsung.health.heart_rate";

static FIELDS: &[FieldDef] = &[
    field("datauuid", "id", Text),
    field("start_time", "start_time", Int),
    field("end_time", "end_time", Int),
    field("time_offset", "time_offset", Int),
    field("heart_rate", "heart_rate", Float),
    field("heart_beat_count", "heart_beat_count", Int),
    field("min", "min", Float),
    field("max", "max", Float),
];

pub static SCHEMA: CategorySchema = CategorySchema {
    data_type: DATA_TYPE,
    fields: FIELDS,
    enrich,
    aggregates: Some(aggregates),
};

fn enrich(_record: &StoreRecord, _normalized: &mut NormalizedRecord) {}

/// Average/min/max rate per bucket plus the number of samples behind it.
fn aggregates() -> Vec<AggregateColumn> {
    vec![
        AggregateColumn::new(AggregateFunction::Average, "heart_rate", "heart_rate"),
        AggregateColumn::new(AggregateFunction::Min, "heart_rate", "min_heart_rate"),
        AggregateColumn::new(AggregateFunction::Max, "heart_rate", "max_heart_rate"),
        AggregateColumn::new(AggregateFunction::Count, "heart_rate", "sample_count"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_aliases() {
        let aliases: Vec<String> = aggregates().into_iter().map(|c| c.alias).collect();
        assert_eq!(
            aliases,
            vec!["heart_rate", "min_heart_rate", "max_heart_rate", "sample_count"]
        );
    }
}
