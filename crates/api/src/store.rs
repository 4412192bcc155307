//! Holder for the latest refresh outcome.
//!
//! Every refresh replaces the stored state wholesale; nothing carries over
//! from one batch to the next.

use std::sync::Arc;

use fleet_health_core::projection::Dashboard;
use fleet_health_core::types::Timestamp;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::error::{AppError, AppResult};

/// Result of one successful refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub refreshed_at: Timestamp,
    /// (pipeline, model) pairs whose performance fetch failed and were
    /// left out of this snapshot.
    pub failed_jobs: usize,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// Outcome of the most recent refresh.
#[derive(Debug, Clone)]
pub enum RefreshState {
    /// No refresh has completed yet.
    Loading,
    Ready(Arc<Snapshot>),
    Failed { error: String, failed_at: Timestamp },
}

impl RefreshState {
    /// Short label used by the health endpoint.
    pub fn label(&self) -> &'static str {
        match self {
            RefreshState::Loading => "loading",
            RefreshState::Ready(_) => "ready",
            RefreshState::Failed { .. } => "failed",
        }
    }
}

/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between handlers and the background refresh task.
///
/// Refreshes are serialized through a separate mutex so an older batch can
/// never overwrite a newer one. Reads never wait on it.
#[derive(Debug)]
pub struct DashboardStore {
    state: RwLock<RefreshState>,
    refresh: Mutex<()>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    /// Create a store in the `Loading` state.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RefreshState::Loading),
            refresh: Mutex::new(()),
        }
    }

    /// Exclusive right to run a refresh; held from fetch until `replace`.
    pub async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh.lock().await
    }

    /// Clone of the current state (snapshots are shared via `Arc`).
    pub async fn current(&self) -> RefreshState {
        self.state.read().await.clone()
    }

    /// Replace the current state.
    pub async fn replace(&self, state: RefreshState) {
        *self.state.write().await = state;
    }

    /// The latest snapshot, or the error a handler should surface.
    pub async fn ready_snapshot(&self) -> AppResult<Arc<Snapshot>> {
        match self.current().await {
            RefreshState::Ready(snapshot) => Ok(snapshot),
            RefreshState::Loading => Err(AppError::NotReady(
                "Fleet data is still loading".to_string(),
            )),
            RefreshState::Failed { error, .. } => Err(AppError::RefreshFailed(error)),
        }
    }
}
