//! # Health Data Core
//!
//! Permission-gated, concurrently aggregated reads over the host health store.
//!
//! ## Overview
//!
//! This crate handles:
//! - Partitioning required read capabilities into granted and denied
//! - One fetcher per category mapping vendor records into generic field maps
//! - Reducing time-grouped aggregate rows into 5-minute bucketed samples
//! - Fanning out across categories and joining into one combined response
//!
//! ```rust,ignore
//! use core_health::{AggregationOrchestrator, CategoryFetcher, PermissionGate, TimeRange};
//!
//! let fetcher = Arc::new(CategoryFetcher::new(store.clone(), BucketFormat::minutely(0)?));
//! let gate = Arc::new(PermissionGate::new(store, settings, Some(ui_host)));
//! let orchestrator = AggregationOrchestrator::new(fetcher, gate);
//!
//! let response = orchestrator.fetch_all(TimeRange::new(start, end)?, true).await?;
//! ```

pub mod bucket;
pub mod codes;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod permission;
pub mod schema;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use bucket::{BucketFormat, BucketedSample};
pub use error::{HealthError, Result};
pub use fetcher::{CategoryFetcher, FetchMode, DEFAULT_BUCKET_WIDTH};
pub use orchestrator::{AggregationOrchestrator, FailurePolicy, FetchPlan, DEFAULT_QUERY_TIMEOUT};
pub use permission::{PermissionGate, PermissionPartition};
pub use types::{
    AccessMode, AggregateResponse, Capability, Category, CategoryData, FieldValue,
    NormalizedRecord, TimeRange,
};
