pub mod dashboard;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /dashboard                      both projections + refresh metadata
/// /dashboard/models               model summary list (health bar)
/// /dashboard/matrix               node x job matrix (heatmap)
/// /dashboard/jobs/{job_key}       single job drill-down
/// /dashboard/refresh              refresh now (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/dashboard", dashboard::router())
}
