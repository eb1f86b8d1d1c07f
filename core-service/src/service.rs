//! Method dispatch: bridge method name → health operation → JSON reply.

use bridge_traits::{BridgeError, HealthDataStore, MethodCall, MethodResponse};
use core_health::{
    AggregateResponse, AggregationOrchestrator, BucketFormat, Capability, CategoryFetcher,
    FetchMode, FetchPlan, HealthError, PermissionGate, PermissionPartition, TimeRange,
};
use core_runtime::HealthConfig;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::methods::{parse_range, HealthMethod};

struct ServiceInner {
    store: Arc<dyn HealthDataStore>,
    fetcher: Arc<CategoryFetcher>,
    orchestrator: AggregationOrchestrator,
    bucket_width: Duration,
    prompt_on_denied: bool,
}

/// Primary façade exposed to host plugins.
///
/// Cheap to clone; clones share the store handle, fetcher and gate.
#[derive(Clone)]
pub struct HealthService {
    inner: Arc<ServiceInner>,
}

impl HealthService {
    pub fn new(config: HealthConfig) -> Result<Self> {
        let format = BucketFormat::minutely(config.store_offset_minutes)?;
        let fetcher = Arc::new(CategoryFetcher::new(config.health_store.clone(), format));
        let gate = Arc::new(PermissionGate::new(
            config.health_store.clone(),
            config.settings_store.clone(),
            config.ui_host.clone(),
        ));
        let orchestrator = AggregationOrchestrator::new(Arc::clone(&fetcher), gate)
            .with_policy(config.failure_policy)
            .with_timeout(config.query_timeout)
            .with_plan(FetchPlan::total(config.bucket_width));

        info!(
            policy = ?config.failure_policy,
            timeout = ?config.query_timeout,
            offset_minutes = config.store_offset_minutes,
            ui_host = config.ui_host.is_some(),
            "Health service initialized"
        );

        Ok(Self {
            inner: Arc::new(ServiceInner {
                store: config.health_store,
                fetcher,
                orchestrator,
                bucket_width: config.bucket_width,
                prompt_on_denied: config.prompt_on_denied,
            }),
        })
    }

    pub fn gate(&self) -> &PermissionGate {
        self.inner.orchestrator.gate()
    }

    /// Handle one bridge call and shape the outcome for the reply primitive.
    pub async fn handle(&self, call: &MethodCall) -> MethodResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!("method_call", method = %call.method, request_id = %request_id);

        async {
            match self.call(call).await {
                Ok(value) => {
                    debug!("Call succeeded");
                    MethodResponse::Success { value }
                }
                Err(ServiceError::UnsupportedMethod(name)) => {
                    warn!(method = %name, "Unsupported method");
                    MethodResponse::NotImplemented
                }
                Err(e) => {
                    error!(code = e.code(), error = %e, "Call failed");
                    error_response(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the operation named by `call` and return its reply payload.
    pub async fn call(&self, call: &MethodCall) -> Result<Value> {
        let method = HealthMethod::from_name(&call.method)?;
        let range = if method.takes_range() {
            Some(parse_range(call)?)
        } else {
            None
        };

        match (method, range) {
            (HealthMethod::Connect, _) => self.connect().await,
            (HealthMethod::Disconnect, _) => self.disconnect().await,
            (HealthMethod::RequestPermissions, _) => self.request_permissions().await,
            (HealthMethod::GetPermissionStatus, _) => self.permission_status().await,
            (HealthMethod::GetTotalData, Some(range)) => {
                let response = self.total_data(range).await?;
                Ok(total_data_reply(&response)?)
            }
            (method, Some(range)) => match method.single_category() {
                Some((category, bucketed)) => {
                    let mode = if bucketed {
                        FetchMode::Buckets(self.inner.bucket_width)
                    } else {
                        FetchMode::Records
                    };
                    let data = self.inner.fetcher.fetch_mode(category, range, mode).await?;
                    info!(category = %category, items = data.len(), "Category fetched");
                    Ok(serde_json::to_value(data)?)
                }
                None => Err(ServiceError::UnsupportedMethod(method.name().to_string())),
            },
            (method, None) => Err(ServiceError::InvalidArguments(format!(
                "{} requires a time range",
                method
            ))),
        }
    }

    pub async fn connect(&self) -> Result<Value> {
        self.inner
            .store
            .connect()
            .await
            .map_err(connection_error)?;
        info!("Health store connected");
        Ok(json!({ "isConnect": true }))
    }

    pub async fn disconnect(&self) -> Result<Value> {
        self.inner
            .store
            .disconnect()
            .await
            .map_err(connection_error)?;
        info!("Health store disconnected");
        Ok(json!({ "isConnect": false }))
    }

    /// Prompt for every read capability that is still denied.
    pub async fn request_permissions(&self) -> Result<Value> {
        let gate = self.gate();
        let current = gate.evaluate(&Capability::all_read()).await?;
        if !current.has_denied() {
            return Ok(partition_reply(&current));
        }

        let prompted = gate.request_interactive(&current.denied).await?;
        let mut granted = current.granted;
        granted.extend(prompted.granted);
        Ok(partition_reply(&PermissionPartition {
            granted,
            denied: prompted.denied,
        }))
    }

    pub async fn permission_status(&self) -> Result<Value> {
        let gate = self.gate();
        let partition = gate.evaluate(&Capability::all_read()).await?;
        let mut reply = partition_reply(&partition);
        reply["asked"] = Value::Bool(gate.has_asked().await?);
        Ok(reply)
    }

    pub async fn total_data(&self, range: TimeRange) -> Result<AggregateResponse> {
        Ok(self
            .inner
            .orchestrator
            .fetch_all(range, self.inner.prompt_on_denied)
            .await?)
    }
}

fn connection_error(error: BridgeError) -> HealthError {
    match error {
        BridgeError::ConnectionFailed(message) => HealthError::Connection(message),
        other => HealthError::Connection(other.to_string()),
    }
}

fn partition_reply(partition: &PermissionPartition) -> Value {
    let names = |set: &std::collections::BTreeSet<Capability>| -> Vec<&'static str> {
        set.iter().map(|c| c.category.name()).collect()
    };
    json!({
        "granted": names(&partition.granted),
        "denied": names(&partition.denied),
    })
}

/// Category map, plus `denied_permissions` and `failed_categories` when
/// either is non-empty.
fn total_data_reply(response: &AggregateResponse) -> Result<Value> {
    let mut reply = Map::new();
    for (category, data) in &response.categories {
        reply.insert(category.name().to_string(), serde_json::to_value(data)?);
    }
    if !response.denied.is_empty() {
        reply.insert("denied_permissions".to_string(), json!(response.denied_names()));
    }
    if !response.failed.is_empty() {
        let failed: Vec<&str> = response.failed.keys().map(|c| c.name()).collect();
        reply.insert("failed_categories".to_string(), json!(failed));
    }
    Ok(Value::Object(reply))
}

fn error_response(error: &ServiceError) -> MethodResponse {
    let details = match error {
        ServiceError::Health(HealthError::Query { category, .. }) => {
            Some(json!({ "category": category.name() }))
        }
        _ => None,
    };
    MethodResponse::Error {
        code: error.code().to_string(),
        message: error.to_string(),
        details,
    }
}
