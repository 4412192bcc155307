//! Handlers for the fleet health dashboard.
//!
//! Read endpoints serve the latest stored snapshot; they never trigger
//! upstream traffic. `POST /refresh` runs a refresh on demand.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use fleet_health_core::aggregate::JobKey;
use fleet_health_core::types::Timestamp;
use serde::Serialize;

use crate::background::refresh::refresh_once;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Outcome of an on-demand refresh.
#[derive(Debug, Serialize)]
pub struct RefreshSummary {
    pub refreshed_at: Timestamp,
    pub jobs: usize,
    pub nodes: usize,
    pub failed_jobs: usize,
}

/// GET /dashboard -- both projections plus refresh metadata.
pub async fn get_dashboard(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = state.store.ready_snapshot().await?;
    Ok(Json(DataResponse { data: &*snapshot }).into_response())
}

/// GET /dashboard/models -- model summary list in health-bar order.
pub async fn list_models(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = state.store.ready_snapshot().await?;
    Ok(Json(DataResponse {
        data: &snapshot.dashboard.summary,
    })
    .into_response())
}

/// GET /dashboard/matrix -- node x job heatmap.
pub async fn get_matrix(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = state.store.ready_snapshot().await?;
    Ok(Json(DataResponse {
        data: &snapshot.dashboard.matrix,
    })
    .into_response())
}

/// GET /dashboard/jobs/{job_key} -- summary and per-node cells for one job.
///
/// `job_key` is `pipeline::model`, percent-encoded.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_key): Path<String>,
) -> AppResult<impl IntoResponse> {
    let key = JobKey::parse(&job_key)?;
    let snapshot = state.store.ready_snapshot().await?;
    let detail = snapshot.dashboard.job_detail(&key)?;
    Ok(Json(DataResponse { data: detail }))
}

/// POST /dashboard/refresh -- fetch and recompute now.
pub async fn refresh(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let snapshot = refresh_once(&state.store, state.source.as_ref()).await?;
    Ok(Json(DataResponse {
        data: RefreshSummary {
            refreshed_at: snapshot.refreshed_at,
            jobs: snapshot.dashboard.summary.len(),
            nodes: snapshot.dashboard.matrix.rows.len(),
            failed_jobs: snapshot.failed_jobs,
        },
    }))
}
