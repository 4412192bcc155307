//! REST client for the leaderboard API and the gateway discovery endpoint.
//!
//! Wraps the read-only endpoints (regions, pipeline capabilities,
//! per-job aggregated stats, orchestrator discovery) using [`reqwest`].

use std::time::Duration;

use fleet_health_core::discovery::DiscoveryStats;
use fleet_health_core::observation::JobPerformance;
use fleet_health_core::types::{ModelId, PipelineId, RegionId};
use serde::Deserialize;

/// A test region the leaderboard probes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    /// Job type probed from this region (`ai` or `transcoding`).
    #[serde(rename = "type")]
    pub region_type: String,
}

/// A pipeline and the models the job tester exercises on it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineCapability {
    pub id: PipelineId,
    #[serde(default)]
    pub models: Vec<ModelId>,
    #[serde(default)]
    pub regions: Vec<RegionId>,
}

#[derive(Debug, Deserialize)]
struct RegionsEnvelope {
    #[serde(default)]
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct PipelinesEnvelope {
    #[serde(default)]
    pipelines: Vec<PipelineCapability>,
}

/// Errors from the upstream REST layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, body decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream returned a non-2xx status code.
    #[error("Upstream API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the leaderboard API, optionally paired with a gateway
/// discovery endpoint.
#[derive(Debug, Clone)]
pub struct LeaderboardApi {
    client: reqwest::Client,
    api_url: String,
    discovery_url: Option<String>,
}

impl LeaderboardApi {
    /// Create a client with its own connection pool and request timeout.
    ///
    /// * `api_url` - Leaderboard base URL, e.g. `https://leaderboard-api.livepeer.cloud`.
    /// * `discovery_url` - Gateway base URL; `None` disables discovery enrichment.
    pub fn new(
        api_url: &str,
        discovery_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_url, discovery_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: &str, discovery_url: Option<&str>) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            discovery_url: discovery_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn discovery_url(&self) -> Option<&str> {
        self.discovery_url.as_deref()
    }

    /// List the regions the leaderboard probes from.
    ///
    /// Sends `GET /api/regions`.
    pub async fn get_regions(&self) -> Result<Vec<Region>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/api/regions", self.api_url))
            .send()
            .await?;

        let envelope: RegionsEnvelope = Self::parse_response(response).await?;
        Ok(envelope.regions)
    }

    /// List every pipeline with its tested models.
    ///
    /// Sends `GET /api/pipelines`.
    pub async fn get_capabilities(&self) -> Result<Vec<PipelineCapability>, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/api/pipelines", self.api_url))
            .send()
            .await?;

        let envelope: PipelinesEnvelope = Self::parse_response(response).await?;
        Ok(envelope.pipelines)
    }

    /// Fetch per-node, per-region stats for one (pipeline, model) pair.
    ///
    /// Sends `GET /api/aggregated_stats?pipeline=..&model=..`.
    pub async fn get_job_performance(
        &self,
        pipeline: &str,
        model: &str,
    ) -> Result<JobPerformance, UpstreamError> {
        let response = self
            .client
            .get(format!("{}/api/aggregated_stats", self.api_url))
            .query(&[("pipeline", pipeline), ("model", model)])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the warm/cold model status of every orchestrator.
    ///
    /// Sends `GET /getOrchestratorAICapabilities` to the discovery URL.
    /// Returns an empty payload when no discovery URL is configured.
    pub async fn get_discovery_stats(&self) -> Result<DiscoveryStats, UpstreamError> {
        let Some(discovery_url) = self.discovery_url.as_deref() else {
            return Ok(DiscoveryStats::default());
        };

        let response = self
            .client
            .get(format!("{discovery_url}/getOrchestratorAICapabilities"))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`UpstreamError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, UpstreamError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipelines_envelope_parses_capabilities() {
        let envelope: PipelinesEnvelope = serde_json::from_str(
            r#"{
                "pipelines": [
                    {
                        "id": "Text to image",
                        "models": ["black-forest-labs/FLUX.1-dev", "ByteDance/SDXL-Lightning"],
                        "regions": ["FRA", "MDW", "SEA"]
                    },
                    { "id": "Upscale" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(envelope.pipelines.len(), 2);
        assert_eq!(envelope.pipelines[0].models.len(), 2);
        assert_eq!(envelope.pipelines[0].regions, vec!["FRA", "MDW", "SEA"]);
        assert!(envelope.pipelines[1].models.is_empty());
    }

    #[test]
    fn regions_envelope_parses_region_type() {
        let envelope: RegionsEnvelope = serde_json::from_str(
            r#"{ "regions": [
                { "id": "SIN", "name": "Singapore", "type": "transcoding" },
                { "id": "SEA", "name": "Seattle", "type": "ai" }
            ] }"#,
        )
        .unwrap();

        assert_eq!(
            envelope.regions[1],
            Region {
                id: "SEA".into(),
                name: "Seattle".into(),
                region_type: "ai".into(),
            }
        );
    }

    #[test]
    fn base_urls_drop_trailing_slash() {
        let api = LeaderboardApi::with_client(
            reqwest::Client::new(),
            "https://leaderboard.example/",
            Some("https://gateway.example/"),
        );
        assert_eq!(api.api_url(), "https://leaderboard.example");
        assert_eq!(api.discovery_url(), Some("https://gateway.example"));
    }

    #[tokio::test]
    async fn discovery_without_url_is_empty() {
        let api = LeaderboardApi::with_client(reqwest::Client::new(), "http://127.0.0.1:9", None);
        let stats = api.get_discovery_stats().await.unwrap();
        assert!(stats.orchestrators.is_empty());
    }
}
