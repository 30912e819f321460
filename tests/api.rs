//! HTTP API tests.
//!
//! Drives the router in-process: status shape, replica reads and updates,
//! validation failures, and method handling.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use beacon::{build_router, AutoscalerConfig, StateStore};

fn test_router() -> (Router, StateStore) {
    let store = StateStore::from_config(&AutoscalerConfig::default()).unwrap();
    (build_router(store.clone()), store)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn is_plain_text(resp: &axum::response::Response) -> bool {
    resp.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/plain"))
}

fn put_replicas(body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/app/replicas")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn welcome_message() {
    let (router, _) = test_router();
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"message": "Welcome to the Auto-Scaler App !!!"})
    );
}

#[tokio::test]
async fn status_reports_initial_state() {
    let (router, _) = test_router();
    let req = Request::builder().uri("/app/status").body(Body::empty()).unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("application/json"));
    assert_eq!(
        body_json(resp).await,
        json!({"cpu": {"highPriority": 0.68}, "replicas": 10})
    );
}

#[tokio::test]
async fn get_replicas() {
    let (router, _) = test_router();
    let req = Request::builder().uri("/app/replicas").body(Body::empty()).unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"replicas": 10}));
}

#[tokio::test]
async fn put_replicas_updates_state() {
    let (router, store) = test_router();

    let resp = router.clone().oneshot(put_replicas(r#"{"replicas":15}"#)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"message": "Replicas updated"}));
    assert_eq!(store.read().await.replicas, 15);

    let req = Request::builder().uri("/app/status").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(body_json(resp).await["replicas"], 15);
}

#[tokio::test]
async fn put_replicas_rejects_out_of_range() {
    let (router, store) = test_router();

    for body in [r#"{"replicas":0}"#, r#"{"replicas":101}"#, r#"{"replicas":-3}"#] {
        let resp = router.clone().oneshot(put_replicas(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert!(is_plain_text(&resp));
        assert_eq!(body_text(resp).await, "Invalid replicas count\n");
    }
    assert_eq!(store.read().await.replicas, 10);
}

#[tokio::test]
async fn put_replicas_rejects_malformed_body() {
    let (router, store) = test_router();

    for body in ["not json", r#"{"replicas":"ten"}"#, r#"{"count":5}"#, ""] {
        let resp = router.clone().oneshot(put_replicas(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body:?}");
        assert!(is_plain_text(&resp));
        assert_eq!(body_text(resp).await, "Invalid request body\n");
    }
    assert_eq!(store.read().await.replicas, 10);
}

#[tokio::test]
async fn put_replicas_ignores_content_type() {
    let (router, store) = test_router();

    let bare = Request::builder()
        .method("PUT")
        .uri("/app/replicas")
        .body(Body::from(r#"{"replicas":20}"#))
        .unwrap();
    let resp = router.clone().oneshot(bare).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.read().await.replicas, 20);

    let form = Request::builder()
        .method("PUT")
        .uri("/app/replicas")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(r#"{"replicas":25}"#))
        .unwrap();
    let resp = router.oneshot(form).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.read().await.replicas, 25);
}

#[tokio::test]
async fn unsupported_method_is_rejected() {
    let (router, _) = test_router();
    let req = Request::builder()
        .method("DELETE")
        .uri("/app/replicas")
        .body(Body::empty())
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[cfg(feature = "prometheus-metrics")]
#[tokio::test]
async fn metrics_endpoint_returns_text() {
    let (router, store) = test_router();
    let metrics = std::sync::Arc::new(beacon::MetricsObserver::new().unwrap());
    metrics.record_state(&store.read().await);
    let router = beacon::api::with_metrics(router, metrics);

    let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.contains("text/plain"));

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("beacon_replicas 10"));
}
