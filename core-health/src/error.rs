use crate::types::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Invalid time range: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Invalid bucket width: {0}")]
    InvalidBucketWidth(String),

    #[error("Store offset of {0} minutes is out of range")]
    InvalidOffset(i32),

    #[error("Category {0} has no bucketed aggregate")]
    NotBucketed(Category),

    #[error("Health store connection failed: {0}")]
    Connection(String),

    #[error("Permission check failed: {0}")]
    Permission(String),

    #[error("No UI host available to present the permission prompt")]
    UiUnavailable,

    #[error("Query for {category} failed: {message}")]
    Query { category: Category, message: String },

    #[error("Unparseable bucket label '{label}': {reason}")]
    LabelParse { label: String, reason: String },

    #[error("Request exceeded deadline of {0} ms")]
    Timeout(u64),

    #[error("Fetch task failed: {0}")]
    TaskFailed(String),

    #[error("Settings store error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, HealthError>;
