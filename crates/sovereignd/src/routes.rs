//! API routes for sovereignd
//!
//! The demo page, recovery runs, counters and read-only lookups against the
//! simulated travel tables.

use crate::render;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sovereign_common::tools::{self, FlightSearchResult, TrainSearchResult};
use sovereign_common::{AgentSettings, RunRecord, SovereignAgent, StageSummary};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Page Routes
// ============================================================================

pub fn page_routes() -> Router<AppStateArc> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppStateArc>) -> Html<String> {
    let config = &state.config;
    Html(render::page(
        &config.presentation,
        &config.llm.model,
        config.llm.enabled,
        state.run_count.load(Ordering::Relaxed),
    ))
}

// ============================================================================
// Run Routes
// ============================================================================

/// Launch request; every field falls back to the configured default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub incident: Option<String>,
    #[serde(default)]
    pub use_llm: Option<bool>,
    #[serde(default)]
    pub delay_secs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_count: u64,
    /// Pause between stage reveals, already clamped
    pub delay_secs: f64,
    pub record: RunRecord,
    /// Rendered stage cards, in stage order
    pub stages: Vec<String>,
    pub stage_titles: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterResponse {
    pub run_count: u64,
}

pub fn run_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/run", post(run_recovery))
        .route("/v1/reset", post(reset))
}

async fn run_recovery(
    State(state): State<AppStateArc>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, (StatusCode, String)> {
    let config = &state.config;
    let incident = req
        .incident
        .unwrap_or_else(|| config.presentation.default_incident.clone());
    let use_llm = req.use_llm.unwrap_or(config.llm.enabled);
    let delay_secs = config
        .presentation
        .clamp_delay(req.delay_secs.unwrap_or(config.presentation.delay_secs));

    // The counter moves on every launch, including ones that fail
    let run_count = state.run_count.fetch_add(1, Ordering::Relaxed) + 1;
    info!("  Run #{} (llm: {})", run_count, use_llm);

    let mut agent = SovereignAgent::new(&AgentSettings::from_config(config, use_llm)).map_err(|e| {
        error!("  Agent initialization failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error initializing agent: {}", e),
        )
    })?;

    let record = agent.run(&incident).await.map_err(|e| {
        error!("  Run failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Execution error: {}", e),
        )
    })?;

    let stage_titles = record
        .stage_logs
        .iter()
        .map(|log| format!("{} Stage {}: {}", render::stage_icon(log.stage), log.stage, log.name))
        .collect();

    Ok(Json(RunResponse {
        run_count,
        delay_secs,
        stages: render::stage_cards(&record),
        stage_titles,
        summary: render::summary(&record),
        record,
    }))
}

async fn reset(State(state): State<AppStateArc>) -> Json<CounterResponse> {
    state.run_count.store(0, Ordering::Relaxed);
    info!("  Demo reset");
    Json(CounterResponse { run_count: 0 })
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Stats Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub run_count: u64,
    pub uptime_seconds: u64,
}

pub fn stats_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/stats", get(get_stats))
}

async fn get_stats(State(state): State<AppStateArc>) -> Json<StatsResponse> {
    Json(StatsResponse {
        run_count: state.run_count.load(Ordering::Relaxed),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Stage Routes
// ============================================================================

pub fn stage_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/stages", get(list_stages))
}

async fn list_stages() -> Json<Vec<StageSummary>> {
    Json(SovereignAgent::stage_summary())
}

// ============================================================================
// Lookup Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRoutesResponse {
    /// `ORIGIN-DESTINATION` keys present in the flight table
    pub routes: Vec<String>,
}

pub fn lookup_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/v1/flights", get(flight_routes))
        .route("/v1/flights/:origin/:destination", get(flights))
        .route("/v1/trains", get(trains))
}

async fn flight_routes() -> Json<FlightRoutesResponse> {
    Json(FlightRoutesResponse {
        routes: tools::known_flight_routes()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// Flight lookups from the daemon always go through the privacy shield
async fn flights(Path((origin, destination)): Path<(String, String)>) -> Json<FlightSearchResult> {
    Json(tools::search_flights(&origin, &destination, true))
}

async fn trains() -> Json<TrainSearchResult> {
    Json(tools::search_trains("Osaka", "Tokyo"))
}
