#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fleet_health_api::config::ServerConfig;
use fleet_health_api::router::build_app_router;
use fleet_health_api::state::AppState;
use fleet_health_api::store::DashboardStore;
use fleet_health_core::observation::{JobPerformance, PipelineResult};
use fleet_health_upstream::api::UpstreamError;
use fleet_health_upstream::batch::{FetchedBatch, FleetSource};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        leaderboard_url: "http://leaderboard.invalid".to_string(),
        discovery_url: None,
        refresh_interval_secs: 60,
        upstream_timeout_secs: 5,
    }
}

/// Fleet source returning a canned batch, or failing when none is set.
pub struct StubSource {
    batch: Option<FetchedBatch>,
    pub calls: AtomicUsize,
}

impl StubSource {
    pub fn with_batch(batch: FetchedBatch) -> Arc<Self> {
        Arc::new(Self {
            batch: Some(batch),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            batch: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FleetSource for StubSource {
    async fn fetch_batch(&self) -> Result<FetchedBatch, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch.clone().ok_or_else(|| UpstreamError::ApiError {
            status: 503,
            body: "capabilities unavailable".to_string(),
        })
    }
}

/// Fleet source that tracks how many fetches overlap.
pub struct SlowSource {
    delay: std::time::Duration,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl SlowSource {
    pub fn new(delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl FleetSource for SlowSource {
    async fn fetch_batch(&self) -> Result<FetchedBatch, UpstreamError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(sample_batch())
    }
}

fn performance(json: &str) -> JobPerformance {
    serde_json::from_str(json).expect("valid performance payload")
}

/// Two measured jobs and one failed pair.
///
/// * `Text to image::sdxl` -- nodes `0xa` (good) and `0xb`.
/// * `Image to text::blip` -- node `0xc` (good), highest composite.
/// * `Text to image::flux` -- fetch failed.
pub fn sample_batch() -> FetchedBatch {
    FetchedBatch {
        results: vec![
            PipelineResult::measured(
                "Text to image",
                "sdxl",
                performance(
                    r#"{
                        "0xa": {
                            "FRA": { "success_rate": 1, "round_trip_score": 0.9, "score": 0.95 },
                            "SEA": { "success_rate": 1, "round_trip_score": 0.8, "score": 0.9 }
                        },
                        "0xb": {
                            "FRA": { "success_rate": 0.5, "round_trip_score": 0.4, "score": 0.45 }
                        }
                    }"#,
                ),
            ),
            PipelineResult::failed("Text to image", "flux", "HTTP 502"),
            PipelineResult::measured(
                "Image to text",
                "blip",
                performance(
                    r#"{ "0xc": { "MDW": { "success_rate": 0.9, "round_trip_score": 0.9, "score": 0.2 } } }"#,
                ),
            ),
        ],
        discovery: None,
    }
}

/// Build application state around the given source with an empty store.
pub fn test_state(source: Arc<dyn FleetSource>) -> AppState {
    AppState {
        config: Arc::new(test_config()),
        store: Arc::new(DashboardStore::new()),
        source,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Send a bodiless request through the router.
pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
