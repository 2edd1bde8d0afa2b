//! Integration tests for the request pipeline
//!
//! **Coverage:**
//! - Credential reuse and refresh around the token endpoint
//! - Retry eligibility: 4xx terminal, 5xx and broken connections retried
//! - Header injection, query strings and body case conversion
//! - Concurrent callers sharing one token fetch
//!
//! **Infrastructure:**
//! - WireMock HTTP server for the API
//! - A raw TCP server for dropped-connection scenarios
//! - `MockClock` for expiry boundaries

#[path = "support.rs"]
mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use incognia_common::time::MockClock;
use incognia_domain::{IncogniaError, RequestDescriptor};
use incognia_infra::api::RequestPipeline;
use incognia_infra::http::build_user_agent;
use serde_json::{json, Map, Value};
use support::{config_for, init_tracing, mount_token, requests_to, token_body, FlakyServer};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pipeline(server: &MockServer, max_retries: u32) -> RequestPipeline {
    RequestPipeline::new(config_for(&server.uri(), max_retries)).expect("pipeline")
}

fn resource(server: &MockServer) -> RequestDescriptor {
    RequestDescriptor::post(format!("{}/v2/resource", server.uri()), json!({"installation_id": "i"}))
}

#[tokio::test]
async fn first_call_fetches_token_and_later_calls_reuse_it() {
    init_tracing();
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(3)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 0);
    assert!(!pipeline.token_cache().is_valid());

    for _ in 0..3 {
        let body = pipeline.request_resource(&resource(&server)).await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    assert!(pipeline.token_cache().is_valid());
    assert_eq!(requests_to(&server, "/v2/token").await, 1);
}

#[tokio::test]
async fn request_carries_auth_content_type_and_user_agent() {
    init_tracing();
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .and(header("authorization", "Bearer tok"))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", build_user_agent().as_str()))
        .and(body_json(json!({"installation_id": "i"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"risk_assessment": "low_risk"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = pipeline(&server, 0).request_resource(&resource(&server)).await.unwrap();

    assert_eq!(body, json!({"riskAssessment": "low_risk"}));
}

#[tokio::test]
async fn get_with_query_string() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/lookup"))
        .and(query_param("dry_run", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nested_list": [{"some_key": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = Map::new();
    query.insert("dry_run".into(), json!(true));
    let descriptor =
        RequestDescriptor::get(format!("{}/v2/lookup", server.uri())).with_query(query);

    let body = pipeline(&server, 0).request_resource(&descriptor).await.unwrap();
    assert_eq!(body, json!({"nestedList": [{"someKey": 1}]}));
}

#[tokio::test]
async fn empty_and_plain_text_bodies() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("GET"))
        .and(path("/v2/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("accepted"))
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 0);
    let empty = RequestDescriptor::get(format!("{}/v2/empty", server.uri()));
    let text = RequestDescriptor::get(format!("{}/v2/text", server.uri()));

    assert_eq!(pipeline.request_resource(&empty).await.unwrap(), Value::Null);
    assert_eq!(pipeline.request_resource(&text).await.unwrap(), json!("accepted"));
}

#[tokio::test]
async fn client_error_is_not_retried() {
    init_tracing();
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\":\"bad\"}"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pipeline(&server, 2).request_resource(&resource(&server)).await.unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.payload(), Some("{\"error\":\"bad\"}"));
}

#[tokio::test]
async fn server_error_is_retried_until_budget_is_spent() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = pipeline(&server, 2).request_resource(&resource(&server)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn server_error_then_success() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(move |_req: &wiremock::Request| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(500)
            } else {
                ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
            }
        })
        .expect(2)
        .mount(&server)
        .await;

    let body = pipeline(&server, 1).request_resource(&resource(&server)).await.unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn dropped_connections_are_retried() {
    init_tracing();
    let server = FlakyServer::start(2, r#"{"ok":true}"#).await;
    let pipeline = RequestPipeline::new(config_for(&server.base_url, 2)).unwrap();
    let descriptor = RequestDescriptor::post(format!("{}/v2/resource", server.base_url), json!({}));

    let body = pipeline.request_resource(&descriptor).await.unwrap();

    assert_eq!(body, json!({"ok": true}));
    assert_eq!(server.resource_attempts(), 3);
}

#[tokio::test]
async fn dropped_connections_exhaust_budget_as_transport_error() {
    let server = FlakyServer::start(usize::MAX, "{}").await;
    let pipeline = RequestPipeline::new(config_for(&server.base_url, 1)).unwrap();
    let descriptor = RequestDescriptor::post(format!("{}/v2/resource", server.base_url), json!({}));

    let err = pipeline.request_resource(&descriptor).await.unwrap_err();

    assert!(matches!(err, IncogniaError::Transport { .. }), "got {err:?}");
    assert_eq!(server.resource_attempts(), 2);
}

#[tokio::test]
async fn token_failure_surfaces_through_resource_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline(&server, 0);
    let err = pipeline.request_resource(&resource(&server)).await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.payload(), Some("invalid_client"));
    assert!(pipeline.token_cache().current().is_none());
    assert_eq!(requests_to(&server, "/v2/resource").await, 0);
}

#[tokio::test]
async fn failing_token_endpoint_spends_one_retry_budget() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = pipeline(&server, 2).request_resource(&resource(&server)).await.unwrap_err();

    assert_eq!(err.status_code(), Some(503));
    assert_eq!(requests_to(&server, "/v2/token").await, 3);
    assert_eq!(requests_to(&server, "/v2/resource").await, 0);
}

#[tokio::test]
async fn token_recovery_within_budget_then_resource_call() {
    let server = MockServer::start().await;
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(move |_req: &wiremock::Request| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(502)
            } else {
                ResponseTemplate::new(200).set_body_json(token_body("tok", 1200))
            }
        })
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let body = pipeline(&server, 2).request_resource(&resource(&server)).await.unwrap();
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn expired_credential_is_refreshed_on_next_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok", 1200)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let clock = MockClock::at_unix_seconds(0);
    let pipeline = RequestPipeline::builder()
        .config(config_for(&server.uri(), 0))
        .clock(Arc::new(clock.clone()))
        .build()
        .unwrap();

    pipeline.request_resource(&resource(&server)).await.unwrap();
    clock.set_unix_seconds(1199);
    pipeline.request_resource(&resource(&server)).await.unwrap();
    assert_eq!(requests_to(&server, "/v2/token").await, 1);

    clock.set_unix_seconds(1200);
    assert!(!pipeline.token_cache().is_valid());
    pipeline.request_resource(&resource(&server)).await.unwrap();

    assert_eq!(requests_to(&server, "/v2/token").await, 2);
    assert_eq!(pipeline.token_cache().current().unwrap().created_at, 1200);
}

#[tokio::test]
async fn request_token_bypasses_cache() {
    let server = MockServer::start().await;
    mount_token(&server, "direct", 1).await;

    let pipeline = pipeline(&server, 0);
    let grant = pipeline.request_token().await.unwrap();

    assert_eq!(grant.access_token, "direct");
    assert!(pipeline.token_cache().current().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_token_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok", 1200))
                .set_delay(std::time::Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(8)
        .mount(&server)
        .await;

    let pipeline = Arc::new(pipeline(&server, 0));
    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = pipeline.clone();
            let descriptor = resource(&server);
            tokio::spawn(async move { pipeline.request_resource(&descriptor).await })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        assert_eq!(result.unwrap().unwrap(), json!({"ok": true}));
    }
}

#[tokio::test]
async fn with_retry_counts_attempts() {
    let server = MockServer::start().await;
    let pipeline = pipeline(&server, 3);

    for k in 0..=3u32 {
        let calls = AtomicU32::new(0);
        let result = pipeline
            .with_retry(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < k {
                        Err(IncogniaError::transport("reset"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result, Ok(k));
        assert_eq!(calls.load(Ordering::SeqCst), k + 1);
    }

    let calls = AtomicU32::new(0);
    let result: Result<(), _> = pipeline
        .with_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(IncogniaError::api(500, n.to_string())) }
        })
        .await;

    assert_eq!(result, Err(IncogniaError::api(500, "3")));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn usage_errors_are_never_retried_even_with_permissive_predicate() {
    let server = MockServer::start().await;
    let pipeline = RequestPipeline::builder()
        .config(config_for(&server.uri(), 5))
        .retry_predicate(|_| true)
        .build()
        .unwrap();

    let calls = AtomicU32::new(0);
    let result: Result<(), _> = pipeline
        .with_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(IncogniaError::usage("No installationId provided")) }
        })
        .await;

    assert_eq!(result, Err(IncogniaError::usage("No installationId provided")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn permissive_predicate_retries_client_errors() {
    let server = MockServer::start().await;
    mount_token(&server, "tok", 1).await;
    Mock::given(method("POST"))
        .and(path("/v2/resource"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let pipeline = RequestPipeline::builder()
        .config(config_for(&server.uri(), 2))
        .retry_predicate(|err| err.status_code() == Some(429))
        .build()
        .unwrap();

    let err = pipeline.request_resource(&resource(&server)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(429));
}
