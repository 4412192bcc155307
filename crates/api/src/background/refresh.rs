//! Periodic dashboard refresh.
//!
//! Each tick fetches a complete batch from upstream, runs the aggregation
//! pipeline on it, and replaces the stored state. A failed fetch replaces
//! the state with `Failed`; the pipeline never runs on a partial batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use fleet_health_core::projection;
use fleet_health_upstream::api::UpstreamError;
use fleet_health_upstream::batch::FleetSource;
use tokio_util::sync::CancellationToken;

use crate::store::{DashboardStore, RefreshState, Snapshot};

/// Fetch one batch and recompute the dashboard from scratch.
///
/// Concurrent callers (the ticker and `POST /dashboard/refresh`) run one
/// at a time, so at most one upstream fan-out is in flight.
pub async fn refresh_once(
    store: &DashboardStore,
    source: &dyn FleetSource,
) -> Result<Arc<Snapshot>, UpstreamError> {
    let _guard = store.lock_refresh().await;
    let started = Instant::now();

    let batch = match source.fetch_batch().await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!(error = %e, "Dashboard refresh failed");
            store
                .replace(RefreshState::Failed {
                    error: e.to_string(),
                    failed_at: Utc::now(),
                })
                .await;
            return Err(e);
        }
    };

    let dashboard = projection::refresh(&batch.results, batch.discovery.as_ref());
    let snapshot = Arc::new(Snapshot {
        refreshed_at: Utc::now(),
        failed_jobs: batch.failed_count(),
        dashboard,
    });

    tracing::info!(
        jobs = snapshot.dashboard.summary.len(),
        nodes = snapshot.dashboard.matrix.rows.len(),
        failed_jobs = snapshot.failed_jobs,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dashboard refreshed",
    );

    store.replace(RefreshState::Ready(Arc::clone(&snapshot))).await;
    Ok(snapshot)
}

/// Run the refresh loop.
///
/// Refreshes immediately, then every `interval`, until `cancel` is
/// triggered. Failures are recorded in the store and retried on the next
/// tick.
pub async fn run(
    store: Arc<DashboardStore>,
    source: Arc<dyn FleetSource>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Dashboard refresh job started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Dashboard refresh job stopping");
                break;
            }
            _ = ticker.tick() => {
                // Error already logged and stored.
                let _ = refresh_once(&store, source.as_ref()).await;
            }
        }
    }
}
