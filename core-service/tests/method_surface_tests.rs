use bridge_desktop::{ConsentScript, HealthFixture, InMemoryHealthStore, ScriptedConsentHost, SqliteSettingsStore};
use bridge_traits::health::{StoreRecord, StoreValue};
use bridge_traits::{MethodCall, MethodResponse, PermissionUiHost};
use core_health::Category;
use core_runtime::{FailurePolicy, HealthConfig};
use core_service::{bootstrap_desktop, HealthService};
use serde_json::{json, Value};
use std::sync::Arc;

fn record(fields: &[(&str, StoreValue)]) -> StoreRecord {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn heart_rate(start: i64, bpm: f64) -> StoreRecord {
    record(&[
        ("start_time", StoreValue::Int(start)),
        ("end_time", StoreValue::Int(start + 1_000)),
        ("heart_rate", StoreValue::Float(bpm)),
    ])
}

fn range(start: i64, end: i64) -> Value {
    json!({ "start": start, "end": end })
}

struct Harness {
    store: Arc<InMemoryHealthStore>,
    service: HealthService,
}

async fn harness(policy: FailurePolicy, host: Option<Arc<dyn PermissionUiHost>>) -> Harness {
    let store = Arc::new(InMemoryHealthStore::new());
    let settings = SqliteSettingsStore::in_memory().await.unwrap();

    let mut builder = HealthConfig::builder()
        .health_store(store.clone())
        .settings_store(Arc::new(settings))
        .failure_policy(policy);
    if let Some(host) = host {
        builder = builder.ui_host(host);
    }

    let service = HealthService::new(builder.build().unwrap()).unwrap();
    service.call(&MethodCall::bare("connect")).await.unwrap();
    Harness { store, service }
}

async fn grant(store: &InMemoryHealthStore, categories: &[Category]) {
    for category in categories {
        store.grant_read(category.data_type()).await;
    }
}

fn error_code(response: &MethodResponse) -> Option<&str> {
    match response {
        MethodResponse::Error { code, .. } => Some(code),
        _ => None,
    }
}

#[tokio::test]
async fn test_heart_rate_series_averages_each_five_minute_bucket() {
    let h = harness(FailurePolicy::FailFast, None).await;
    grant(&h.store, &[Category::HeartRate]).await;
    h.store
        .insert_all(
            Category::HeartRate.data_type(),
            vec![
                heart_rate(0, 70.0),
                heart_rate(60_000, 70.0),
                heart_rate(300_000, 72.0),
                heart_rate(360_000, 73.0),
            ],
        )
        .await;

    let reply = h
        .service
        .call(&MethodCall::new("getHeartRate5minSeries", range(0, 600_000)))
        .await
        .unwrap();

    let samples = reply.as_array().unwrap();
    assert_eq!(samples.len(), 2);

    assert_eq!(samples[0]["bucket_start"], json!(300_000));
    assert_eq!(samples[0]["bucket_label"], json!("1970-01-01 00:05"));
    assert_eq!(samples[0]["aggregates"]["heart_rate"].as_f64(), Some(72.5));
    assert_eq!(samples[0]["aggregates"]["sample_count"].as_f64(), Some(2.0));

    assert_eq!(samples[1]["bucket_start"], json!(0));
    assert_eq!(samples[1]["bucket_label"], json!("1970-01-01 00:00"));
    assert_eq!(samples[1]["aggregates"]["heart_rate"].as_f64(), Some(70.0));
    assert_eq!(samples[1]["aggregates"]["sample_count"].as_f64(), Some(2.0));
}

#[tokio::test]
async fn test_total_data_with_only_steps_granted() {
    let h = harness(FailurePolicy::FailFast, None).await;
    grant(&h.store, &[Category::StepCount]).await;
    h.store
        .insert_all(
            Category::StepCount.data_type(),
            vec![
                record(&[("start_time", StoreValue::Int(0)), ("count", StoreValue::Int(100))]),
                record(&[("start_time", StoreValue::Int(60_000)), ("count", StoreValue::Int(50))]),
            ],
        )
        .await;

    let reply = h
        .service
        .call(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await
        .unwrap();

    for name in ["exercise", "heart_rate", "sleep", "nutrition"] {
        assert_eq!(reply[name], json!([]), "{} should be empty", name);
    }
    let steps = reply["step_count"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["aggregates"]["count"].as_f64(), Some(150.0));
    assert_eq!(
        reply["denied_permissions"],
        json!(["exercise", "heart_rate", "sleep", "nutrition"])
    );
    assert!(reply.get("failed_categories").is_none());
}

#[tokio::test]
async fn test_total_data_with_everything_denied_is_empty_not_an_error() {
    let h = harness(FailurePolicy::FailFast, None).await;

    let reply = h
        .service
        .call(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await
        .unwrap();

    for category in Category::ALL {
        assert_eq!(reply[category.name()], json!([]));
    }
    assert_eq!(reply["denied_permissions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_exercise_sessions_carry_display_names() {
    let h = harness(FailurePolicy::FailFast, None).await;
    grant(&h.store, &[Category::Exercise]).await;
    h.store
        .insert_all(
            Category::Exercise.data_type(),
            vec![
                record(&[
                    ("datauuid", StoreValue::from("older")),
                    ("start_time", StoreValue::Int(1_000)),
                    ("exercise_type", StoreValue::Int(9999)),
                ]),
                record(&[
                    ("datauuid", StoreValue::from("newer")),
                    ("start_time", StoreValue::Int(2_000)),
                    ("exercise_type", StoreValue::Int(1002)),
                ]),
            ],
        )
        .await;

    let reply = h
        .service
        .call(&MethodCall::new("getExerciseSessions", range(0, 10_000)))
        .await
        .unwrap();

    assert_eq!(reply[0]["id"], json!("newer"));
    assert_eq!(reply[0]["exercise_name"], json!("Running"));
    assert_eq!(reply[1]["id"], json!("older"));
    assert_eq!(reply[1]["exercise_name"], json!("Unknown"));
}

#[tokio::test]
async fn test_unsupported_method_is_not_implemented() {
    let h = harness(FailurePolicy::FailFast, None).await;

    let response = h.service.handle(&MethodCall::bare("getWeight")).await;
    assert_eq!(response, MethodResponse::NotImplemented);
}

#[tokio::test]
async fn test_inverted_range_is_rejected_before_any_query() {
    let store = Arc::new(InMemoryHealthStore::new());
    let config = HealthConfig::builder()
        .health_store(store.clone())
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
        .build()
        .unwrap();
    let service = HealthService::new(config).unwrap();

    // Never connected: any store call would fail with a different code.
    for method in ["getTotalData", "getSleepData", "getStepCountSeries"] {
        let response = service
            .handle(&MethodCall::new(method, range(600_000, 0)))
            .await;
        assert_eq!(error_code(&response), Some("INVALID_ARGUMENTS"), "{}", method);
    }

    let missing = service
        .handle(&MethodCall::new("getSleepData", json!({ "start": 0 })))
        .await;
    assert_eq!(error_code(&missing), Some("INVALID_ARGUMENTS"));
}

#[tokio::test]
async fn test_connect_failure_is_a_connection_error() {
    let store = Arc::new(InMemoryHealthStore::new());
    store.fail_connect("service unavailable").await;
    let config = HealthConfig::builder()
        .health_store(store.clone())
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
        .build()
        .unwrap();
    let service = HealthService::new(config).unwrap();

    let response = service.handle(&MethodCall::bare("connect")).await;
    match response {
        MethodResponse::Error { code, message, .. } => {
            assert_eq!(code, "CONNECTION_ERROR");
            assert!(message.contains("service unavailable"));
        }
        other => panic!("expected connection error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnect_ends_the_session() {
    let h = harness(FailurePolicy::FailFast, None).await;
    grant(&h.store, &[Category::Sleep]).await;

    let reply = h.service.call(&MethodCall::bare("disconnect")).await.unwrap();
    assert_eq!(reply, json!({ "isConnect": false }));

    let response = h
        .service
        .handle(&MethodCall::new("getSleepData", range(0, 1_000)))
        .await;
    assert_eq!(error_code(&response), Some("QUERY_ERROR"));
}

#[tokio::test]
async fn test_total_data_prompts_once_per_install() {
    let store = Arc::new(InMemoryHealthStore::new());
    let host = Arc::new(
        ScriptedConsentHost::new()
            .applying_to(store.clone())
            .then_grant([Category::StepCount.data_type()])
            .then(ConsentScript::GrantAll),
    );
    let config = HealthConfig::builder()
        .health_store(store.clone())
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
        .ui_host(host.clone())
        .build()
        .unwrap();
    let service = HealthService::new(config).unwrap();
    service.call(&MethodCall::bare("connect")).await.unwrap();

    let first = service
        .call(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await
        .unwrap();
    assert_eq!(
        first["denied_permissions"],
        json!(["exercise", "heart_rate", "sleep", "nutrition"])
    );
    assert_eq!(host.prompt_count().await, 1);

    let second = service
        .call(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await
        .unwrap();
    assert_eq!(second["denied_permissions"], first["denied_permissions"]);
    assert_eq!(host.prompt_count().await, 1);

    let status = service
        .call(&MethodCall::bare("getPermissionStatus"))
        .await
        .unwrap();
    assert_eq!(status["asked"], json!(true));
    assert_eq!(status["granted"], json!(["step_count"]));
}

#[tokio::test]
async fn test_request_permissions_prompts_for_denied_capabilities() {
    let store = Arc::new(InMemoryHealthStore::new());
    let host = Arc::new(
        ScriptedConsentHost::new()
            .applying_to(store.clone())
            .then(ConsentScript::GrantAll),
    );
    let config = HealthConfig::builder()
        .health_store(store.clone())
        .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
        .ui_host(host.clone())
        .build()
        .unwrap();
    let service = HealthService::new(config).unwrap();
    service.call(&MethodCall::bare("connect")).await.unwrap();
    store.grant_read(Category::Sleep.data_type()).await;

    let reply = service
        .call(&MethodCall::bare("requestPermissions"))
        .await
        .unwrap();
    assert_eq!(reply["denied"], json!([]));
    assert_eq!(reply["granted"].as_array().unwrap().len(), 5);
    assert_eq!(host.prompts().await[0].len(), 4);

    let status = service
        .call(&MethodCall::bare("getPermissionStatus"))
        .await
        .unwrap();
    assert_eq!(status["asked"], json!(false));
}

#[tokio::test]
async fn test_request_permissions_without_ui_host_is_a_permission_error() {
    let h = harness(FailurePolicy::FailFast, None).await;

    let response = h.service.handle(&MethodCall::bare("requestPermissions")).await;
    assert_eq!(error_code(&response), Some("PERMISSION_ERROR"));
}

#[tokio::test]
async fn test_failed_category_fails_the_whole_request_by_default() {
    let h = harness(FailurePolicy::FailFast, None).await;
    grant(&h.store, &Category::ALL).await;
    h.store
        .fail_queries(Category::Sleep.data_type(), "sleep index corrupted")
        .await;

    let response = h
        .service
        .handle(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await;
    match response {
        MethodResponse::Error { code, details, .. } => {
            assert_eq!(code, "QUERY_ERROR");
            assert_eq!(details, Some(json!({ "category": "sleep" })));
        }
        other => panic!("expected a single query error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_degrade_policy_reports_failed_categories() {
    let h = harness(FailurePolicy::Degrade, None).await;
    grant(&h.store, &Category::ALL).await;
    h.store.insert(Category::HeartRate.data_type(), heart_rate(0, 61.0)).await;
    h.store
        .fail_queries(Category::Sleep.data_type(), "sleep index corrupted")
        .await;

    let reply = h
        .service
        .call(&MethodCall::new("getTotalData", range(0, 600_000)))
        .await
        .unwrap();

    assert_eq!(reply["sleep"], json!([]));
    assert_eq!(reply["failed_categories"], json!(["sleep"]));
    assert_eq!(reply["heart_rate"].as_array().unwrap().len(), 1);
    assert!(reply.get("denied_permissions").is_none());
}

#[tokio::test]
async fn test_desktop_bootstrap_serves_fixture_in_store_offset() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/heart_rate_tokyo.json");
    let fixture = HealthFixture::load(path).await.unwrap();
    let service = bootstrap_desktop(fixture, None).await.unwrap();
    service.call(&MethodCall::bare("connect")).await.unwrap();

    let reply = service
        .call(&MethodCall::new("getHeartRate5minSeries", range(0, 600_000)))
        .await
        .unwrap();

    let samples = reply.as_array().unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0]["bucket_label"], json!("1970-01-01 09:05"));
    assert_eq!(samples[0]["bucket_start"], json!(300_000));
    assert_eq!(samples[1]["bucket_label"], json!("1970-01-01 09:00"));
    assert_eq!(samples[1]["aggregates"]["heart_rate"].as_f64(), Some(65.0));
}
