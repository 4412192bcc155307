//! Route definitions for the fleet health dashboard.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Dashboard routes mounted at `/dashboard`.
///
/// ```text
/// GET  /                  -> get_dashboard
/// GET  /models            -> list_models
/// GET  /matrix            -> get_matrix
/// GET  /jobs/{job_key}    -> get_job
/// POST /refresh           -> refresh
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::get_dashboard))
        .route("/models", get(dashboard::list_models))
        .route("/matrix", get(dashboard::get_matrix))
        .route("/jobs/{job_key}", get(dashboard::get_job))
        .route("/refresh", post(dashboard::refresh))
}
