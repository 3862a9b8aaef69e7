//! HTTP route tests for sovereignd.
//!
//! Requests go straight into the router with `oneshot`; no socket is bound.
//! The mission context path points into a temp dir so defaults apply.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sovereign_common::Config;
use sovereignd::{app, AppState};
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_state(dir: &TempDir) -> Arc<AppState> {
    let mut config = Config::default();
    config.mission.context_path = dir.path().join("context.json");
    Arc::new(AppState::new(config))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

// ============================================================================
// Runs
// ============================================================================

#[tokio::test]
async fn test_run_returns_eight_rendered_stages() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);

    let (status, body) = send(
        app(state.clone()),
        post_json("/v1/run", json!({"incident": "X", "use_llm": false, "delay_secs": 0.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let run: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(run["run_count"], 1);
    assert_eq!(run["delay_secs"], 0.5);
    assert_eq!(run["stages"].as_array().unwrap().len(), 8);
    assert_eq!(run["stage_titles"].as_array().unwrap().len(), 8);
    assert_eq!(run["record"]["incident"], "X");
    assert_eq!(run["record"]["final_solution"]["bookings_secured"], 3);
    assert!(run["summary"].as_str().unwrap().contains("MISSION RECOVERY COMPLETE"));
    assert_eq!(state.run_count.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_run_defaults_and_clamps_delay() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);

    let (status, body) = send(app(state), post_json("/v1/run", json!({"delay_secs": 60.0}))).await;
    assert_eq!(status, StatusCode::OK);

    let run: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(run["delay_secs"], 3.0);
    assert_eq!(
        run["record"]["incident"],
        "CEO Flight AF276 to Tokyo cancelled due to weather at 23:00"
    );
}

#[tokio::test]
async fn test_inverted_delay_range_still_runs() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.mission.context_path = dir.path().join("context.json");
    config.presentation.min_delay_secs = 3.0;
    config.presentation.max_delay_secs = 0.5;
    let state = Arc::new(AppState::new(config));

    let (status, body) = send(app(state), post_json("/v1/run", json!({"delay_secs": 2.0}))).await;
    assert_eq!(status, StatusCode::OK);

    let run: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(run["delay_secs"], 1.5);
    assert_eq!(run["stages"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_stage_card_html_is_escaped() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);

    let (_, body) = send(
        app(state),
        post_json("/v1/run", json!({"incident": "<img src=x onerror=alert(1)>"})),
    )
    .await;
    let run: Value = serde_json::from_slice(&body).unwrap();
    let first = run["stages"][0].as_str().unwrap();
    assert!(!first.contains("<img"));
    assert!(first.contains("&lt;img"));
}

#[tokio::test]
async fn test_malformed_context_reports_init_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("context.json"), "{ broken").unwrap();
    let state = test_state(&dir);

    let (status, body) = send(app(state.clone()), post_json("/v1/run", json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().starts_with("Error initializing agent"));
    assert_eq!(state.run_count.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_reset_zeroes_counter() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(&dir);

    send(app(state.clone()), post_json("/v1/run", json!({}))).await;
    send(app(state.clone()), post_json("/v1/run", json!({}))).await;
    assert_eq!(state.run_count.load(Ordering::Relaxed), 2);

    let reset = Request::builder()
        .method("POST")
        .uri("/v1/reset")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(state.clone()), reset).await;
    assert_eq!(status, StatusCode::OK);
    let counter: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(counter["run_count"], 0);

    let (_, body) = send(app(state), get("/v1/stats")).await;
    let stats: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["run_count"], 0);
}

// ============================================================================
// Read-only routes
// ============================================================================

#[tokio::test]
async fn test_index_page_renders() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(app(test_state(&dir)), get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Sovereign Executive Agent"));
    assert!(html.contains("LAUNCH SOVEREIGN RECOVERY PROTOCOL"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(app(test_state(&dir)), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_stages_listing() {
    let dir = tempfile::tempdir().unwrap();
    let (_, body) = send(app(test_state(&dir)), get("/v1/stages")).await;
    let stages: Value = serde_json::from_slice(&body).unwrap();
    let stages = stages.as_array().unwrap();
    assert_eq!(stages.len(), 8);
    assert_eq!(stages[0]["name"], "Edge AI");
}

#[tokio::test]
async fn test_flight_lookup_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let (_, body) = send(app(test_state(&dir)), get("/v1/flights/CDG/KIX")).await;
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["query_type"], "ANONYMOUS");
    assert_eq!(result["privacy_status"], "PII_REDACTED");
    assert_eq!(result["results"].as_array().unwrap().len(), 2);

    let (_, body) = send(app(test_state(&dir)), get("/v1/flights/CDG/LAX")).await;
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert!(result["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_flight_route_listing() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send(app(test_state(&dir)), get("/v1/flights")).await;
    assert_eq!(status, StatusCode::OK);
    let listing: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(listing["routes"], json!(["CDG-HND", "CDG-KIX", "CDG-NRT"]));
}

#[tokio::test]
async fn test_train_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let (_, body) = send(app(test_state(&dir)), get("/v1/trains")).await;
    let result: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(result["service"], "JR Central Shinkansen");
    assert_eq!(result["schedules"][0]["train"], "Nozomi 64");
}
