//! HTTP surface consumed by the UI layer.

use std::time::Duration;

use axum::debug_handler;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use tower_http::timeout::TimeoutLayer;

use crate::{ProgressError, ProgressHandler, ProgressReport, ProgressView, WorkoutTypeSummary};

#[debug_handler]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[debug_handler]
async fn workout_types(
    State(handler): State<ProgressHandler>,
) -> Result<Json<Vec<WorkoutTypeSummary>>, (StatusCode, String)> {
    handler.workout_types().await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn progress(
    State(handler): State<ProgressHandler>,
    Path(key): Path<String>,
) -> Result<Json<ProgressView>, (StatusCode, String)> {
    handler.progress(&key).await.map(Json).map_err(map_err)
}

#[debug_handler]
async fn report(
    State(handler): State<ProgressHandler>,
) -> Result<Json<ProgressReport>, (StatusCode, String)> {
    handler.report().await.map(Json).map_err(map_err)
}

fn map_err(e: ProgressError) -> (StatusCode, String) {
    match e {
        ProgressError::History(_) => (StatusCode::BAD_GATEWAY, e.to_string()),
        ProgressError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Routes for workout types, per-type progress and the combined report.
pub fn router(handler: ProgressHandler) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/workout-types", get(workout_types))
        .route("/workout-types/{key}/progress", get(progress))
        .route("/report", get(report))
        .with_state(handler)
}

/// All routes are GETs; anything larger is rejected.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Cap request handling time and body size. Slow upstream calls answer 408.
pub fn with_limits(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
