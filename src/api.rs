//! HTTP surface over the [`StateStore`].
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Welcome message |
//! | GET | `/app/status` | Current CPU reading and replica count |
//! | GET | `/app/replicas` | Current replica count |
//! | PUT | `/app/replicas` | Set the replica count (`{"replicas": N}`) |
//! | GET | `/metrics` | Prometheus exposition (`prometheus-metrics` feature) |

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tracing::debug;

use crate::error::AutoscalerError;
use crate::state::StateStore;
use crate::types::{ReplicaUpdate, SystemState};

pub const WELCOME_MESSAGE: &str = "Welcome to the Auto-Scaler App !!!";

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StateStore,
}

/// Build the API router.
pub fn build_router(store: StateStore) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/app/status", get(get_status))
        .route("/app/replicas", get(get_replicas).put(update_replicas))
        .with_state(ApiState { store })
}

/// Plain-text error body, newline terminated
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, format!("{}\n", message)).into_response()
}

impl IntoResponse for AutoscalerError {
    fn into_response(self) -> Response {
        if self.is_invalid_replica_count() {
            error_response(StatusCode::BAD_REQUEST, "Invalid replicas count")
        } else {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string())
        }
    }
}

/// GET /
pub async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// GET /app/status
pub async fn get_status(State(state): State<ApiState>) -> Json<SystemState> {
    Json(state.store.read().await)
}

/// GET /app/replicas
pub async fn get_replicas(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let snapshot = state.store.read().await;
    Json(json!({ "replicas": snapshot.replicas }))
}

/// PUT /app/replicas
///
/// The body is decoded as JSON whatever `content-type` the client sent.
pub async fn update_replicas(State(state): State<ApiState>, body: Bytes) -> Response {
    let update: ReplicaUpdate = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            debug!("Rejected replica update body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match state.store.set_replicas(update.replicas).await {
        Ok(()) => Json(json!({ "message": "Replicas updated" })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mount `GET /metrics` serving the observer's registry.
#[cfg(feature = "prometheus-metrics")]
pub fn with_metrics(
    router: Router,
    metrics: std::sync::Arc<crate::metrics::MetricsObserver>,
) -> Router {
    router.merge(
        Router::new()
            .route("/metrics", get(prometheus_metrics))
            .with_state(metrics),
    )
}

/// GET /metrics
#[cfg(feature = "prometheus-metrics")]
pub async fn prometheus_metrics(
    State(metrics): State<std::sync::Arc<crate::metrics::MetricsObserver>>,
) -> Response {
    match metrics.render() {
        Ok(body) => (
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplicaBounds;

    fn test_state() -> ApiState {
        let store = StateStore::new(SystemState::new(10, 0.68), ReplicaBounds::new(1, 100)).unwrap();
        ApiState { store }
    }

    #[tokio::test]
    async fn update_in_range_succeeds() {
        let state = test_state();
        let resp = update_replicas(State(state.clone()), Bytes::from_static(b"{\"replicas\":15}")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.store.read().await.replicas, 15);
    }

    #[tokio::test]
    async fn update_out_of_range_is_bad_request() {
        let state = test_state();
        let resp = update_replicas(State(state.clone()), Bytes::from_static(b"{\"replicas\":101}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.read().await.replicas, 10);
    }

    #[tokio::test]
    async fn error_bodies_are_plain_text() {
        let state = test_state();
        let resp = update_replicas(State(state), Bytes::from_static(b"{")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Invalid request body\n");
    }

    #[test]
    fn non_validation_errors_are_server_errors() {
        let resp = AutoscalerError::engine_not_running("stopped").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
