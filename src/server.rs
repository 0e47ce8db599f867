//! Thin HTTP surface over the job manager and the probe engine: submit a
//! scan job, poll its status, or run a synchronous scan.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    jobs::JobManager,
    scanner::{self, ProbeOpts},
    types::{ScanRange, ScanRequest, SubmitRequest},
};

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobManager>,
    pub probe: ProbeOpts,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/scan", post(post_scan))
        .route("/api/execute", post(post_execute))
        .route("/api/status/{scan_id}", get(get_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn spawn_server(bind: &str, state: AppState) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "serving scan API");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Synchronous scan: validates the request, blocks for the full scan, and
/// returns the open ports directly. Validation failures are the one place
/// a caller sees an error response instead of a job status.
async fn post_scan(
    State(app): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let range = match ScanRange::new(req.start_port, req.end_port) {
        Ok(range) => range,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match scanner::scan_range(&req.target_ip, range, &app.probe).await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

/// Submit an asynchronous scan job; returns immediately with the job id.
async fn post_execute(
    State(app): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    let id = app.jobs.submit(req).await;
    format!("Scan launched with ID: {id}")
}

/// Status lookup; an unrecognized id yields the sentinel string, not an
/// error response.
async fn get_status(
    State(app): State<AppState>,
    Path(scan_id): Path<String>,
) -> impl IntoResponse {
    app.jobs.status(&scan_id).await
}
