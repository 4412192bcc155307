use std::sync::Arc;

use fleet_health_upstream::batch::FleetSource;

use crate::config::ServerConfig;
use crate::store::DashboardStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Latest refresh outcome, shared with the background refresh task.
    pub store: Arc<DashboardStore>,
    /// Upstream data source used by on-demand refreshes.
    pub source: Arc<dyn FleetSource>,
}
