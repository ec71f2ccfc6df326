//! HTTP API for intents, telemetry, pod discovery and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use decision_lib::{
    health::ComponentStatus, DecisionService, Intent, MetricSet, PodInfo, SchedulingIntent,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "Decision Maker API Server";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");
const ENDPOINTS: &str = "/health, /healthz, /readyz, /version, /metrics, POST_/api/v1/intents, GET_/api/v1/scheduling/strategies, POST_/api/v1/metrics, GET_/api/v1/metrics, GET_/api/v1/pods/pids";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DecisionService>,
}

impl AppState {
    pub fn new(service: Arc<DecisionService>) -> Self {
        Self { service }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: String,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            timestamp: now_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmptyResponse {}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct IntentsRequest {
    pub intents: Vec<Intent>,
}

#[derive(Debug, Serialize)]
pub struct ListIntentsResponse {
    pub scheduling: Vec<SchedulingIntent>,
}

#[derive(Debug, Serialize)]
struct PodPidsResponse {
    success: bool,
    message: &'static str,
    timestamp: String,
    pods: Vec<PodInfo>,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    message: &'static str,
    version: &'static str,
    endpoints: &'static str,
}

#[derive(Debug, Serialize)]
struct ServiceHealthResponse {
    status: &'static str,
    timestamp: String,
    service: &'static str,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// JSON error body; logs `cause` at error for 5xx and warn otherwise
fn error_response(status: StatusCode, message: &str, cause: impl Display) -> Response {
    if status.is_server_error() {
        error!(status = status.as_u16(), error = %cause, "{}", message);
    } else {
        warn!(status = status.as_u16(), error = %cause, "{}", message);
    }

    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn invalid_payload(rejection: &JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, "Invalid request payload", rejection)
}

/// Plain liveness payload
async fn health() -> impl IntoResponse {
    Json(ServiceHealthResponse {
        status: "healthy",
        timestamp: now_rfc3339(),
        service: SERVICE_NAME,
    })
}

/// Component health: 200 while operational, 503 once unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.service.health().health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.service.health().readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn version() -> impl IntoResponse {
    Json(VersionResponse {
        message: SERVICE_NAME,
        version: SERVICE_VERSION,
        endpoints: ENDPOINTS,
    })
}

/// Prometheus scrape endpoint over the service's own registry
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.service.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
            e,
        );
    }

    (
        StatusCode::OK,
        [("content-type", encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

async fn handle_intents(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IntentsRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_payload(&rejection),
    };

    match state.service.process_intents(request.intents).await {
        Ok(_) => Json(SuccessResponse::<EmptyResponse>::new(None)).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to process intents",
            e,
        ),
    }
}

async fn list_intents(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scheduling = state.service.list_scheduling_intents();
    Json(SuccessResponse::new(Some(ListIntentsResponse { scheduling })))
}

async fn update_metrics(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MetricSet>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(snapshot)) => {
            state.service.update_metrics(snapshot).await;
            Json(SuccessResponse::<EmptyResponse>::new(None)).into_response()
        }
        Err(rejection) => invalid_payload(&rejection),
    }
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.service.metrics_snapshot() {
        Some(snapshot) => Json(SuccessResponse::new(Some(*snapshot))).into_response(),
        None => Json(serde_json::json!({
            "success": true,
            "message": "No metrics data available yet. Waiting for scheduler to report metrics.",
            "data": null,
        }))
        .into_response(),
    }
}

async fn get_pod_pids(State(state): State<Arc<AppState>>) -> Response {
    match state.service.pod_infos().await {
        Ok(pods) => Json(PodPidsResponse {
            success: true,
            message: "Pod-PID mappings retrieved successfully",
            timestamp: now_rfc3339(),
            pods: pods.into_values().collect(),
        })
        .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to get pod-pid mappings",
            e,
        ),
    }
}

/// Access log for `/api` routes
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/v1/intents", post(handle_intents))
        .route("/v1/scheduling/strategies", get(list_intents))
        .route("/v1/metrics", post(update_metrics).get(get_metrics))
        .route("/v1/pods/pids", get(get_pod_pids))
        .layer(middleware::from_fn(log_requests));

    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/version", get(version))
        .route("/metrics", get(metrics))
        .nest("/api", api)
        .with_state(state)
}

/// Serve the API until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
