//! HTTP gateway (Axum) exposing policy lookup.
//!
//! Used by the `tripguard serve` subcommand.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{LookupRequest, LookupResponse, PassageView, lookup_handler};
pub use state::{HandlerState, ReadinessProbe};

/// Response header carrying a short machine-readable outcome.
pub const TRIPGUARD_STATUS_HEADER: &str = "x-tripguard-status";
pub const TRIPGUARD_STATUS_HEALTHY: &str = "healthy";
pub const TRIPGUARD_STATUS_READY: &str = "ready";
pub const TRIPGUARD_STATUS_PENDING: &str = "pending";
pub const TRIPGUARD_STATUS_FOUND: &str = "found";
pub const TRIPGUARD_STATUS_NO_MATCH: &str = "no_match";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/policy/lookup", post(lookup_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub encoder: String,
    pub encoder_mode: String,
    pub reranker: String,
    pub reranker_mode: String,
    pub corpus: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        TRIPGUARD_STATUS_HEADER,
        HeaderValue::from_static(TRIPGUARD_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let readiness = state.probe.readiness();

    let loaded = |ready: bool| {
        if ready {
            TRIPGUARD_STATUS_READY
        } else {
            TRIPGUARD_STATUS_PENDING
        }
        .to_string()
    };
    let mode = |stub: bool| if stub { "stub" } else { "model" }.to_string();

    let components = ComponentStatus {
        http: TRIPGUARD_STATUS_READY.to_string(),
        encoder: loaded(readiness.encoder_loaded),
        encoder_mode: mode(readiness.encoder_stub),
        reranker: loaded(readiness.reranker_loaded),
        reranker_mode: mode(readiness.reranker_stub),
        corpus: loaded(readiness.store_connected),
    };

    let is_ready = readiness.is_ready();
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready {
        TRIPGUARD_STATUS_READY
    } else {
        TRIPGUARD_STATUS_PENDING
    };

    let mut headers = HeaderMap::new();
    headers.insert(TRIPGUARD_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg.to_string(),
            components,
        }),
    )
        .into_response()
}
