//! # Category Fetcher
//!
//! Issues one query per call against the shared store handle and reshapes
//! the result:
//!
//! - [`CategoryFetcher::fetch`] reads raw records sorted by descending start
//!   time and maps each through the category's field table
//! - [`CategoryFetcher::fetch_bucketed`] asks the store for a time-grouped
//!   aggregate and runs the rows through the bucket reducer
//!
//! Query failures come back as [`HealthError::Query`] scoped to the category.
//! Nothing is retried here.

use bridge_traits::health::{
    AggregateRequest, HealthDataStore, ReadRequest, SortOrder, TimeGroup, TimeGroupUnit,
    START_TIME_PROPERTY,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub use core_runtime::config::DEFAULT_BUCKET_WIDTH;

use crate::bucket::{self, BucketFormat, BucketedSample};
use crate::error::{HealthError, Result};
use crate::types::{Category, CategoryData, NormalizedRecord, TimeRange};

/// How a category's data is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Records,
    Buckets(Duration),
}

#[derive(Clone)]
pub struct CategoryFetcher {
    store: Arc<dyn HealthDataStore>,
    bucket_format: BucketFormat,
}

impl CategoryFetcher {
    pub fn new(store: Arc<dyn HealthDataStore>, bucket_format: BucketFormat) -> Self {
        Self {
            store,
            bucket_format,
        }
    }

    pub fn bucket_format(&self) -> &BucketFormat {
        &self.bucket_format
    }

    /// Fetch in the given mode.
    pub async fn fetch_mode(
        &self,
        category: Category,
        range: TimeRange,
        mode: FetchMode,
    ) -> Result<CategoryData> {
        match mode {
            FetchMode::Records => self.fetch(category, range).await.map(CategoryData::Records),
            FetchMode::Buckets(width) => self
                .fetch_bucketed(category, range, width)
                .await
                .map(CategoryData::Buckets),
        }
    }

    /// Read and normalize every record of `category` starting inside `range`,
    /// newest first.
    #[instrument(skip(self), fields(category = %category, start = range.start(), end = range.end()))]
    pub async fn fetch(&self, category: Category, range: TimeRange) -> Result<Vec<NormalizedRecord>> {
        let schema = category.schema();
        let request = ReadRequest::new(schema.data_type, range.start(), range.end())
            .with_properties(schema.properties())
            .sorted_by(START_TIME_PROPERTY, SortOrder::Descending);

        let rows = self
            .store
            .read(request)
            .await
            .map_err(|e| HealthError::Query {
                category,
                message: e.to_string(),
            })?;

        debug!(rows = rows.len(), "Read query completed");

        Ok(rows.iter().map(|row| schema.normalize(row)).collect())
    }

    /// Aggregate `category` into fixed-width buckets over `range`, newest
    /// bucket first.
    #[instrument(skip(self), fields(category = %category, start = range.start(), end = range.end()))]
    pub async fn fetch_bucketed(
        &self,
        category: Category,
        range: TimeRange,
        bucket_width: Duration,
    ) -> Result<Vec<BucketedSample>> {
        let columns_fn = category
            .schema()
            .aggregates
            .ok_or(HealthError::NotBucketed(category))?;
        let columns = columns_fn();
        let amount = bucket_minutes(bucket_width)?;

        let request = AggregateRequest {
            data_type: category.data_type().to_string(),
            start_time: range.start(),
            end_time: range.end(),
            columns,
            time_group: TimeGroup {
                unit: TimeGroupUnit::Minutely,
                amount,
                time_property: START_TIME_PROPERTY.to_string(),
                label_alias: self.bucket_format.label_column().to_string(),
                label_pattern: self.bucket_format.pattern().to_string(),
            },
            sort_order: SortOrder::Descending,
        };

        let rows = self
            .store
            .aggregate(request)
            .await
            .map_err(|e| HealthError::Query {
                category,
                message: e.to_string(),
            })?;

        debug!(rows = rows.len(), "Aggregate query completed");

        Ok(bucket::reduce(rows, &self.bucket_format))
    }
}

/// Bucket width as a whole number of minutes.
pub fn bucket_minutes(width: Duration) -> Result<u32> {
    let secs = width.as_secs();
    if width.subsec_nanos() != 0 || secs == 0 || secs % 60 != 0 {
        return Err(HealthError::InvalidBucketWidth(format!(
            "{:?} is not a positive whole number of minutes",
            width
        )));
    }
    let minutes = secs / 60;
    if minutes > 24 * 60 {
        return Err(HealthError::InvalidBucketWidth(format!(
            "{} minutes exceeds one day",
            minutes
        )));
    }
    Ok(minutes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockStore;
    use bridge_traits::error::BridgeError;
    use bridge_traits::health::StoreValue;

    fn range(start: i64, end: i64) -> TimeRange {
        TimeRange::new(start, end).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_builds_descending_read_and_normalizes() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .withf(|request| {
                request.data_type == "com.samsung.health.exercise"
                    && request.start_time == 0
                    && request.end_time == 10_000
                    && request.sort_order == SortOrder::Descending
                    && request.sort_property == "start_time"
                    && request.properties.iter().any(|p| p == "exercise_type")
            })
            .times(1)
            .returning(|_| {
                Ok(vec![[
                    ("start_time".to_string(), StoreValue::Int(5_000)),
                    ("exercise_type".to_string(), StoreValue::Int(1002)),
                ]
                .into_iter()
                .collect()])
            });

        let fetcher = CategoryFetcher::new(Arc::new(store), BucketFormat::default());
        let records = fetcher.fetch(Category::Exercise, range(0, 10_000)).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["exercise_name"].as_str(), Some("Running"));
    }

    #[tokio::test]
    async fn test_fetch_bucketed_requests_five_minute_groups() {
        let mut store = MockStore::new();
        store
            .expect_aggregate()
            .withf(|request| {
                request.data_type == "com.samsung.health.step_count"
                    && request.time_group.amount == 5
                    && request.time_group.unit == TimeGroupUnit::Minutely
                    && request.time_group.label_alias == "binning_time"
                    && request.time_group.label_pattern == "%Y-%m-%d %H:%M"
                    && request.columns.len() == 4
            })
            .times(1)
            .returning(|_| {
                Ok(vec![[
                    ("binning_time".to_string(), StoreValue::from("1970-01-01 00:05")),
                    ("count".to_string(), StoreValue::Int(412)),
                ]
                .into_iter()
                .collect()])
            });

        let fetcher = CategoryFetcher::new(Arc::new(store), BucketFormat::default());
        let samples = fetcher
            .fetch_bucketed(Category::StepCount, range(0, 600_000), DEFAULT_BUCKET_WIDTH)
            .await
            .unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].bucket_start, 300_000);
        assert_eq!(samples[0].aggregate("count"), Some(412.0));
    }

    #[tokio::test]
    async fn test_query_failure_is_category_scoped() {
        let mut store = MockStore::new();
        store
            .expect_read()
            .returning(|_| Err(BridgeError::QueryFailed("cursor closed".into())));

        let fetcher = CategoryFetcher::new(Arc::new(store), BucketFormat::default());
        match fetcher.fetch(Category::Sleep, range(0, 1)).await {
            Err(HealthError::Query { category, message }) => {
                assert_eq!(category, Category::Sleep);
                assert!(message.contains("cursor closed"));
            }
            other => panic!("expected Query error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_bucketable_category_issues_no_query() {
        let store = MockStore::new();
        let fetcher = CategoryFetcher::new(Arc::new(store), BucketFormat::default());

        let result = fetcher
            .fetch_bucketed(Category::Nutrition, range(0, 1), DEFAULT_BUCKET_WIDTH)
            .await;
        assert!(matches!(result, Err(HealthError::NotBucketed(Category::Nutrition))));
    }

    #[test]
    fn test_bucket_minutes_validation() {
        assert_eq!(bucket_minutes(Duration::from_secs(300)).unwrap(), 5);
        assert_eq!(bucket_minutes(Duration::from_secs(3600)).unwrap(), 60);
        assert!(bucket_minutes(Duration::from_secs(90)).is_err());
        assert!(bucket_minutes(Duration::ZERO).is_err());
        assert!(bucket_minutes(Duration::from_millis(60_500)).is_err());
        assert!(bucket_minutes(Duration::from_secs(2 * 86_400)).is_err());
    }
}
