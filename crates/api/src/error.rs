use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fleet_health_core::error::CoreError;
use fleet_health_upstream::api::UpstreamError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fleet_health_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An on-demand refresh could not fetch its batch.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// The most recent background refresh failed.
    #[error("Refresh failed: {0}")]
    RefreshFailed(String),

    /// No refresh has completed yet.
    #[error("Not ready: {0}")]
    NotReady(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Upstream errors ---
            AppError::Upstream(err) => {
                tracing::error!(error = %err, "Upstream fetch failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Failed to fetch fleet data from upstream".to_string(),
                )
            }
            AppError::RefreshFailed(msg) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("Latest refresh failed: {msg}"),
            ),

            AppError::NotReady(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "NOT_READY", msg.clone())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
