//! Nutrition intake entries.

use bridge_traits::health::StoreRecord;

use super::{code, field, CategorySchema, FieldKind::*, FieldDef};
use crate::codes;
use crate::types::{FieldValue, NormalizedRecord};

pub const DATA_TYPE: &str = "com.samsung.health.nutrition";

static FIELDS: &[FieldDef] = &[
    field("datauuid", "id", Text),
    field("start_time", "start_time", Int),
    field("time_offset", "time_offset", Int),
    field("title", "title", Text),
    field("meal_type", "meal_type", Int),
    field("calorie", "calorie", Float),
    field("total_fat", "total_fat", Float),
    field("saturated_fat", "saturated_fat", Float),
    field("polysaturated_fat", "polysaturated_fat", Float),
    field("monosaturated_fat", "monosaturated_fat", Float),
    field("trans_fat", "trans_fat", Float),
    field("carbohydrate", "carbohydrate", Float),
    field("dietary_fiber", "dietary_fiber", Float),
    field("sugar", "sugar", Float),
    field("protein", "protein", Float),
    field("cholesterol", "cholesterol", Float),
    field("sodium", "sodium", Float),
    field("potassium", "potassium", Float),
    field("vitamin_a", "vitamin_a", Float),
    field("vitamin_c", "vitamin_c", Float),
    field("calcium", "calcium", Float),
    field("iron", "iron", Float),
];

pub static SCHEMA: CategorySchema = CategorySchema {
    data_type: DATA_TYPE,
    fields: FIELDS,
    enrich,
    aggregates: None,
};

fn enrich(record: &StoreRecord, normalized: &mut NormalizedRecord) {
    let name = code(record, "meal_type")
        .map(codes::meal_name)
        .unwrap_or(codes::UNKNOWN);
    normalized.insert("meal_name".into(), FieldValue::from(name));
}
