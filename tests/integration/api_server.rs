//! Integration tests for the HTTP surface

use axum_test::TestServer;
use intrabar::core::{create_router, AppState, RuntimeStatus};
use intrabar::metrics::Metrics;
use intrabar::models::SignalSide;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::test_utils::monday;

fn server_with(status: RuntimeStatus) -> (TestServer, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().unwrap());
    let state = AppState::new(metrics.clone(), Arc::new(RwLock::new(status)));
    (TestServer::new(create_router(state)).unwrap(), metrics)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _) = server_with(RuntimeStatus::default());

    let response = server.get("/health").await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "intrabar-trader");
    assert!(json["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (server, metrics) = server_with(RuntimeStatus::default());
    metrics.record_signal(SignalSide::Sell);

    server.get("/health").await.assert_status_ok();
    let response = server.get("/metrics").await;
    response.assert_status_ok();

    let body = response.text();
    assert!(body.contains("intrabar_http_requests_total"));
    assert!(body.contains("intrabar_signals_emitted_total{side=\"sell\"} 1"));
}

#[tokio::test]
async fn test_status_endpoint() {
    let (server, _) = server_with(RuntimeStatus {
        symbol: "SOXL".to_string(),
        run_mode: "paper".to_string(),
        latest_bar: Some(monday(10, 15)),
        ..RuntimeStatus::default()
    });

    let response = server.get("/status").await;
    response.assert_status_ok();

    let json: Value = response.json();
    assert_eq!(json["symbol"], "SOXL");
    assert_eq!(json["run_mode"], "paper");
    assert_eq!(json["latest_bar"], "2024-03-04T10:15:00");
    assert!(json["last_signal"].is_null());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (server, _) = server_with(RuntimeStatus::default());
    server.get("/nope").expect_failure().await.assert_status_not_found();
}
