//! # Aggregation Orchestrator
//!
//! Fans out one Category Fetcher task per granted capability, substitutes an
//! empty sequence for every denied one, and joins the results into a single
//! [`AggregateResponse`].
//!
//! ## Join semantics
//!
//! - [`FailurePolicy::FailFast`]: the first failed fetch fails the whole
//!   request. The remaining tasks are aborted when the `JoinSet` drops.
//! - [`FailurePolicy::Degrade`]: failed categories get an empty sequence and
//!   are listed in [`AggregateResponse::failed`].
//!
//! A panicked or cancelled task always fails the request.
//!
//! When a query timeout is configured it bounds the whole join; on expiry
//! every outstanding fetch is aborted and the request fails with
//! [`HealthError::Timeout`].

use core_async::task::{JoinError, JoinSet};
use core_async::time::timeout;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub use core_runtime::config::{FailurePolicy, DEFAULT_QUERY_TIMEOUT};

use crate::error::{HealthError, Result};
use crate::fetcher::{CategoryFetcher, FetchMode, DEFAULT_BUCKET_WIDTH};
use crate::permission::{PermissionGate, PermissionPartition};
use crate::types::{AggregateResponse, Capability, Category, CategoryData, TimeRange};

/// Which categories a combined request covers, and how each is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    entries: Vec<(Category, FetchMode)>,
}

impl FetchPlan {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add or replace the mode for `category`.
    pub fn with(mut self, category: Category, mode: FetchMode) -> Self {
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some(entry) => entry.1 = mode,
            None => self.entries.push((category, mode)),
        }
        self
    }

    /// All five categories: heart rate and step count as bucketed series,
    /// the rest as plain records.
    pub fn total(bucket_width: Duration) -> Self {
        Category::ALL.into_iter().fold(Self::new(), |plan, category| {
            let mode = if category.is_bucketable() {
                FetchMode::Buckets(bucket_width)
            } else {
                FetchMode::Records
            };
            plan.with(category, mode)
        })
    }

    pub fn entries(&self) -> &[(Category, FetchMode)] {
        &self.entries
    }

    pub fn mode(&self, category: Category) -> Option<FetchMode> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, mode)| *mode)
    }

    /// Read capabilities for every planned category.
    pub fn required(&self) -> BTreeSet<Capability> {
        self.entries
            .iter()
            .map(|(category, _)| Capability::read(*category))
            .collect()
    }
}

impl Default for FetchPlan {
    fn default() -> Self {
        Self::total(DEFAULT_BUCKET_WIDTH)
    }
}

fn empty_for(mode: FetchMode) -> CategoryData {
    match mode {
        FetchMode::Records => CategoryData::Records(Vec::new()),
        FetchMode::Buckets(_) => CategoryData::Buckets(Vec::new()),
    }
}

type FetchOutcome = (Category, Result<CategoryData>);

pub struct AggregationOrchestrator {
    fetcher: Arc<CategoryFetcher>,
    gate: Arc<PermissionGate>,
    policy: FailurePolicy,
    timeout: Option<Duration>,
    plan: FetchPlan,
}

impl AggregationOrchestrator {
    pub fn new(fetcher: Arc<CategoryFetcher>, gate: Arc<PermissionGate>) -> Self {
        Self {
            fetcher,
            gate,
            policy: FailurePolicy::default(),
            timeout: Some(DEFAULT_QUERY_TIMEOUT),
            plan: FetchPlan::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `None` lets the join run unbounded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_plan(mut self, plan: FetchPlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Run the gate over the plan, then fetch every granted category.
    #[instrument(skip(self), fields(start = range.start(), end = range.end()))]
    pub async fn fetch_all(&self, range: TimeRange, prompt: bool) -> Result<AggregateResponse> {
        let partition = self
            .gate
            .evaluate_with_prompt(&self.plan.required(), prompt)
            .await?;
        self.dispatch(range, &partition).await
    }

    /// Fetch the granted part of `partition` concurrently and join.
    #[instrument(skip(self, partition), fields(
        granted = partition.granted.len(),
        denied = partition.denied.len()
    ))]
    pub async fn dispatch(
        &self,
        range: TimeRange,
        partition: &PermissionPartition,
    ) -> Result<AggregateResponse> {
        let mut response = AggregateResponse::default();
        let mut tasks: JoinSet<FetchOutcome> = JoinSet::new();

        for &(category, mode) in self.plan.entries() {
            let capability = Capability::read(category);
            if !partition.is_granted(&capability) {
                response.categories.insert(category, empty_for(mode));
                response.denied.insert(category);
                continue;
            }

            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move { (category, fetcher.fetch_mode(category, range, mode).await) });
        }

        debug!(launched = tasks.len(), denied = response.denied.len(), "Dispatched category fetches");

        let join = join_all(tasks, response, self.policy, self.plan.clone());
        let response = match self.timeout {
            Some(limit) => match timeout(limit, join).await {
                Ok(result) => result?,
                Err(_) => {
                    error!(timeout_ms = limit.as_millis() as u64, "Combined fetch timed out");
                    return Err(HealthError::Timeout(limit.as_millis() as u64));
                }
            },
            None => join.await?,
        };

        info!(
            items = response.total_items(),
            denied = response.denied.len(),
            failed = response.failed.len(),
            "Combined fetch completed"
        );
        Ok(response)
    }
}

async fn join_all(
    mut tasks: JoinSet<FetchOutcome>,
    mut response: AggregateResponse,
    policy: FailurePolicy,
    plan: FetchPlan,
) -> Result<AggregateResponse> {
    while let Some(joined) = tasks.join_next().await {
        let (category, outcome) = joined.map_err(task_failed)?;
        match outcome {
            Ok(data) => {
                response.categories.insert(category, data);
            }
            Err(e) if policy == FailurePolicy::FailFast => {
                error!(category = %category, error = %e, "Category fetch failed");
                return Err(e);
            }
            Err(e) => {
                warn!(category = %category, error = %e, "Category fetch failed, degrading");
                let mode = plan.mode(category).unwrap_or(FetchMode::Records);
                response.categories.insert(category, empty_for(mode));
                response.failed.insert(category, e.to_string());
            }
        }
    }
    Ok(response)
}

fn task_failed(e: JoinError) -> HealthError {
    error!(error = %e, "Category fetch task did not complete");
    HealthError::TaskFailed(e.to_string())
}
