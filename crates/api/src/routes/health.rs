use axum::extract::State;
use axum::{routing::get, Json, Router};
use fleet_health_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;
use crate::store::RefreshState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// `loading`, `ready`, or `failed`.
    pub dashboard: &'static str,
    /// When the current snapshot was computed, if any.
    pub refreshed_at: Option<Timestamp>,
    /// When the latest refresh failed, if it did.
    pub failed_at: Option<Timestamp>,
    /// Error of the latest refresh, if it failed.
    pub last_error: Option<String>,
    pub refresh_interval_secs: u64,
}

/// GET /health -- returns service and refresh health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let current = state.store.current().await;

    let (status, refreshed_at, failed_at, last_error) = match &current {
        RefreshState::Loading => ("ok", None, None, None),
        RefreshState::Ready(snapshot) => ("ok", Some(snapshot.refreshed_at), None, None),
        RefreshState::Failed { error, failed_at } => {
            ("degraded", None, Some(*failed_at), Some(error.clone()))
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        dashboard: current.label(),
        refreshed_at,
        failed_at,
        last_error,
        refresh_interval_secs: state.config.refresh_interval_secs,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
