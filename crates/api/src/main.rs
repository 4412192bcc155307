//! `fleet-health-api` -- fleet health dashboard backend.
//!
//! Polls the leaderboard API on a fixed interval, recomputes the
//! per-model summary and node x job matrix on every successful batch, and
//! serves them as JSON to the dashboard frontend.
//!
//! See [`ServerConfig::from_env`] for the environment variables.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fleet_health_upstream::api::LeaderboardApi;
use fleet_health_upstream::batch::FleetSource;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fleet_health_api::background;
use fleet_health_api::config::ServerConfig;
use fleet_health_api::router::build_app_router;
use fleet_health_api::state::AppState;
use fleet_health_api::store::DashboardStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleet_health_api=info,fleet_health_upstream=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        leaderboard_url = %config.leaderboard_url,
        discovery_url = config.discovery_url.as_deref().unwrap_or("<disabled>"),
        refresh_interval_secs = config.refresh_interval_secs,
        "Loaded server configuration",
    );

    // --- Upstream client ---
    let api = LeaderboardApi::new(
        &config.leaderboard_url,
        config.discovery_url.as_deref(),
        Duration::from_secs(config.upstream_timeout_secs),
    )
    .expect("Failed to build upstream HTTP client");
    let source: Arc<dyn FleetSource> = Arc::new(api);

    // --- Background refresh ---
    let store = Arc::new(DashboardStore::new());
    let refresh_cancel = CancellationToken::new();
    let refresh_handle = tokio::spawn(background::refresh::run(
        Arc::clone(&store),
        Arc::clone(&source),
        Duration::from_secs(config.refresh_interval_secs),
        refresh_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        source,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    refresh_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), refresh_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
