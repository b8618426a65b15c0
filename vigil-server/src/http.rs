//! HTTP surface
//!
//! # Routes
//!
//! | Method     | Path        | Answer                                         |
//! |------------|-------------|------------------------------------------------|
//! | GET        | `/predict`  | latest reading, or a "no readings yet" detail  |
//! | GET, POST  | `/reset`    | resets the pipeline, returns its new status    |
//! | GET        | `/status`   | pipeline and ingestion worker status           |
//! | GET        | `/health`   | liveness                                       |
//! | GET        | `/`         | dashboard `index.html`                         |
//! | GET        | `/static/*` | dashboard assets                               |
//!
//! Handlers that need the pipeline lock take it on tokio's blocking pool;
//! none of them waits on the transport.

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method},
    middleware::{self as axum_middleware, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use vigil_core::{IngestStatus, IngestStatusHandle, Monitor, PipelineStatus};

use crate::error::{ApiError, ApiResult};
use crate::Model;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline and latest reading
    pub monitor: Monitor<Model>,
    /// Ingestion worker status
    pub ingest: IngestStatusHandle,
    /// Dashboard directory
    pub static_dir: PathBuf,
}

/// Create the router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let static_dir = state.static_dir.clone();

    let mut router = Router::new()
        .route("/", get(index))
        .route("/predict", get(predict))
        .route("/reset", get(reset).post(reset))
        .route("/status", get(status))
        .route("/health", get(health));

    if static_dir.is_dir() {
        router = router.nest_service("/static", ServeDir::new(static_dir));
    }

    router
        .layer(axum_middleware::from_fn(log_request))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// CORS policy; any origin when the list is empty
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods([Method::GET, Method::POST]);

    // Wildcards are rejected by browsers once credentials are allowed
    if origins.is_empty() {
        layer.allow_origin(Any).allow_headers(Any)
    } else {
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    info!(
        "{} {} {} {:?}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed()
    );
    response
}

async fn predict(State(state): State<AppState>) -> Response {
    match state.monitor.latest() {
        Some(reading) => Json(json!({ "transformed": &*reading })).into_response(),
        None => Json(json!({ "detail": "no readings yet" })).into_response(),
    }
}

#[derive(Serialize)]
struct ResetResponse {
    detail: &'static str,
    status: PipelineStatus,
}

async fn reset(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    let status = with_monitor(state.monitor, |monitor| monitor.reset()).await?;
    info!("Pipeline reset requested over HTTP");
    Ok(Json(ResetResponse {
        detail: "pipeline reset",
        status,
    }))
}

#[derive(Serialize)]
struct StatusResponse {
    pipeline: PipelineStatus,
    ingest: IngestStatus,
}

async fn status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    let pipeline = with_monitor(state.monitor, |monitor| monitor.status()).await?;
    Ok(Json(StatusResponse {
        pipeline,
        ingest: state.ingest.get(),
    }))
}

/// Run `f` against the pipeline on the blocking pool
///
/// The ingestion thread holds the pipeline lock for a whole model fit.
async fn with_monitor<F, R>(monitor: Monitor<Model>, f: F) -> ApiResult<R>
where
    F: FnOnce(&Monitor<Model>) -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&monitor))
        .await
        .map_err(|e| ApiError::Internal(format!("pipeline task failed: {}", e)))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let candidates = [state.static_dir.join("index.html"), PathBuf::from("index.html")];

    for path in &candidates {
        if let Some(page) = read_page(path).await? {
            return Ok(Html(page));
        }
    }
    Err(ApiError::NotFound("frontend not found".into()))
}

async fn read_page(path: &Path) -> ApiResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(page) => Ok(Some(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ApiError::Internal(format!("{}: {}", path.display(), e))),
    }
}
