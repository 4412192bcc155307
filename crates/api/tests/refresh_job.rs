//! Integration tests for the background refresh job.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{SlowSource, StubSource};
use fleet_health_api::background::refresh::{refresh_once, run};
use fleet_health_api::store::{DashboardStore, RefreshState};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn refresh_once_stores_snapshot() {
    let store = DashboardStore::new();
    let source = StubSource::with_batch(common::sample_batch());

    let snapshot = refresh_once(&store, source.as_ref()).await.unwrap();
    assert_eq!(snapshot.failed_jobs, 1);
    assert_eq!(snapshot.dashboard.summary.len(), 2);
    assert_matches!(store.current().await, RefreshState::Ready(stored) if Arc::ptr_eq(&stored, &snapshot));
}

#[tokio::test]
async fn failed_refresh_replaces_previous_snapshot() {
    let store = DashboardStore::new();
    refresh_once(&store, StubSource::with_batch(common::sample_batch()).as_ref())
        .await
        .unwrap();

    assert!(refresh_once(&store, StubSource::failing().as_ref()).await.is_err());
    assert_matches!(store.current().await, RefreshState::Failed { .. });
}

#[tokio::test]
async fn repeated_refreshes_produce_identical_dashboards() {
    let store = DashboardStore::new();
    let source = StubSource::with_batch(common::sample_batch());

    let first = refresh_once(&store, source.as_ref()).await.unwrap();
    let second = refresh_once(&store, source.as_ref()).await.unwrap();
    assert_eq!(
        serde_json::to_string(&first.dashboard).unwrap(),
        serde_json::to_string(&second.dashboard).unwrap()
    );
}

#[tokio::test]
async fn concurrent_refreshes_run_one_at_a_time() {
    let store = DashboardStore::new();
    let source = SlowSource::new(Duration::from_millis(50));

    let (first, second) = tokio::join!(
        refresh_once(&store, source.as_ref()),
        refresh_once(&store, source.as_ref()),
    );

    let (first, second) = (first.unwrap(), second.unwrap());
    assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    // The later refresh is the one left in the store.
    let latest = if second.refreshed_at >= first.refreshed_at { second } else { first };
    assert_matches!(store.current().await, RefreshState::Ready(stored) if Arc::ptr_eq(&stored, &latest));
}

#[tokio::test]
async fn run_refreshes_immediately_and_stops_on_cancel() {
    let store = Arc::new(DashboardStore::new());
    let source = StubSource::with_batch(common::sample_batch());
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(run(
        Arc::clone(&store),
        source.clone(),
        Duration::from_secs(3600),
        cancel.clone(),
    ));

    // The first tick fires immediately.
    for _ in 0..50 {
        if store.current().await.label() == "ready" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(source.call_count(), 1);
    assert_eq!(store.current().await.label(), "ready");

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("refresh job stops after cancel")
        .unwrap();
}
