//! Fan-out fetch of one complete refresh batch.
//!
//! A batch is all-or-nothing at the transport level: if capabilities or
//! (when enabled) discovery cannot be fetched, the whole batch fails and
//! the aggregation pipeline must not run. Individual performance requests
//! may fail independently; those pairs are handed over as
//! [`JobReport::Failed`](fleet_health_core::observation::JobReport) and
//! skipped by the normalizer.

use async_trait::async_trait;
use fleet_health_core::discovery::DiscoveryStats;
use fleet_health_core::observation::PipelineResult;
use fleet_health_core::types::{ModelId, PipelineId};
use futures::future::join_all;

use crate::api::{LeaderboardApi, PipelineCapability, UpstreamError};

/// Everything one refresh needs from upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBatch {
    /// One entry per (pipeline, model) pair, in capability order.
    pub results: Vec<PipelineResult>,
    /// `None` when discovery enrichment is disabled.
    pub discovery: Option<DiscoveryStats>,
}

impl FetchedBatch {
    /// Number of pairs whose performance request failed.
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

/// Source of fetch batches.
///
/// Implemented by [`LeaderboardApi`]; the service holds it as a trait
/// object so tests can supply canned batches.
#[async_trait]
pub trait FleetSource: Send + Sync {
    async fn fetch_batch(&self) -> Result<FetchedBatch, UpstreamError>;
}

/// Expand capabilities into (pipeline, model) pairs, in capability order.
pub fn job_pairs(capabilities: &[PipelineCapability]) -> Vec<(PipelineId, ModelId)> {
    capabilities
        .iter()
        .flat_map(|capability| {
            capability
                .models
                .iter()
                .map(move |model| (capability.id.clone(), model.clone()))
        })
        .collect()
}

impl LeaderboardApi {
    /// Fetch one pair's report, capturing failure as an error marker.
    async fn fetch_report(&self, pipeline: &str, model: &str) -> PipelineResult {
        match self.get_job_performance(pipeline, model).await {
            Ok(data) => PipelineResult::measured(pipeline, model, data),
            Err(e) => {
                tracing::warn!(
                    pipeline,
                    model,
                    error = %e,
                    "Job performance fetch failed -- excluding job from this refresh",
                );
                PipelineResult::failed(pipeline, model, e.to_string())
            }
        }
    }
}

#[async_trait]
impl FleetSource for LeaderboardApi {
    async fn fetch_batch(&self) -> Result<FetchedBatch, UpstreamError> {
        let capabilities = self.get_capabilities().await?;
        let pairs = job_pairs(&capabilities);
        tracing::debug!(
            pipelines = capabilities.len(),
            jobs = pairs.len(),
            "Fetched capabilities, requesting job performance",
        );

        let reports = join_all(
            pairs
                .iter()
                .map(|(pipeline, model)| self.fetch_report(pipeline, model)),
        );

        let (results, discovery) = if self.discovery_url().is_some() {
            let (results, discovery) = tokio::join!(reports, self.get_discovery_stats());
            (results, Some(discovery?))
        } else {
            (reports.await, None)
        };

        let batch = FetchedBatch { results, discovery };
        tracing::debug!(
            jobs = batch.results.len(),
            failed = batch.failed_count(),
            "Fetch batch complete",
        );
        Ok(batch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use fleet_health_core::observation::{JobPerformance, JobReport};
    use serde_json::json;

    use super::*;

    /// Serve a minimal leaderboard and gateway on an ephemeral port.
    ///
    /// `Text to image` lists `sdxl` and `flux`; stats for `flux` answer 500.
    async fn spawn_leaderboard() -> String {
        async fn pipelines() -> Json<serde_json::Value> {
            Json(json!({ "pipelines": [{ "id": "Text to image", "models": ["sdxl", "flux"] }] }))
        }

        async fn aggregated_stats(Query(params): Query<HashMap<String, String>>) -> Response {
            if params.get("model").map(String::as_str) == Some("flux") {
                return (StatusCode::INTERNAL_SERVER_ERROR, "model offline").into_response();
            }
            Json(json!({
                "0xa": { "FRA": { "success_rate": 1, "round_trip_score": 0.9, "score": 0.95 } }
            }))
            .into_response()
        }

        async fn discovery() -> Json<serde_json::Value> {
            Json(json!({ "orchestrators": [{ "address": "0xa", "pipelines": [] }] }))
        }

        let app = Router::new()
            .route("/api/pipelines", get(pipelines))
            .route("/api/aggregated_stats", get(aggregated_stats))
            .route("/getOrchestratorAICapabilities", get(discovery));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn capability(id: &str, models: &[&str]) -> PipelineCapability {
        PipelineCapability {
            id: id.to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
            regions: Vec::new(),
        }
    }

    #[test]
    fn job_pairs_expand_in_capability_order() {
        let pairs = job_pairs(&[
            capability("Text to image", &["flux", "sdxl"]),
            capability("Upscale", &[]),
            capability("Image to text", &["blip"]),
        ]);
        assert_eq!(
            pairs,
            vec![
                ("Text to image".to_string(), "flux".to_string()),
                ("Text to image".to_string(), "sdxl".to_string()),
                ("Image to text".to_string(), "blip".to_string()),
            ]
        );
    }

    #[test]
    fn job_pairs_of_no_capabilities_is_empty() {
        assert!(job_pairs(&[]).is_empty());
    }

    #[test]
    fn failed_count_counts_error_markers() {
        let batch = FetchedBatch {
            results: vec![
                PipelineResult::measured("P", "a", JobPerformance::new()),
                PipelineResult::failed("P", "b", "timeout"),
                PipelineResult::failed("P", "c", "HTTP 500"),
            ],
            discovery: None,
        };
        assert_eq!(batch.failed_count(), 2);
    }

    #[tokio::test]
    async fn unreachable_capabilities_fail_the_batch() {
        // Port 9 (discard) on loopback refuses connections.
        let api = LeaderboardApi::new("http://127.0.0.1:9", None, std::time::Duration::from_secs(2))
            .unwrap();
        let err = api.fetch_batch().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
    }

    #[tokio::test]
    async fn failed_job_stats_do_not_fail_the_batch() {
        let url = spawn_leaderboard().await;
        let api = LeaderboardApi::new(&url, None, Duration::from_secs(5)).unwrap();

        let batch = api.fetch_batch().await.unwrap();

        assert_eq!(batch.results.len(), 2);
        assert_eq!(batch.failed_count(), 1);
        assert!(batch.discovery.is_none());

        let sdxl = &batch.results[0];
        assert_eq!(sdxl.model, "sdxl");
        match &sdxl.report {
            JobReport::Measured(data) => assert_eq!(data["0xa"]["FRA"].score, 0.95),
            JobReport::Failed(reason) => panic!("sdxl should be measured, got: {reason}"),
        }

        let flux = &batch.results[1];
        assert_eq!(flux.model, "flux");
        assert!(flux.is_failed());
    }

    #[tokio::test]
    async fn configured_discovery_is_fetched_with_the_batch() {
        let url = spawn_leaderboard().await;
        let api = LeaderboardApi::new(&url, Some(&url), Duration::from_secs(5)).unwrap();

        let batch = api.fetch_batch().await.unwrap();

        let discovery = batch.discovery.as_ref().expect("discovery enabled");
        assert_eq!(discovery.orchestrators.len(), 1);
        assert_eq!(discovery.orchestrators[0].address, "0xa");
        assert_eq!(batch.failed_count(), 1);
    }

    #[tokio::test]
    async fn unreachable_discovery_fails_the_batch() {
        let url = spawn_leaderboard().await;
        let api = LeaderboardApi::new(&url, Some("http://127.0.0.1:9"), Duration::from_secs(2))
            .unwrap();

        let err = api.fetch_batch().await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
    }
}
