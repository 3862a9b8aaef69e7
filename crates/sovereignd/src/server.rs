//! HTTP server for sovereignd

use crate::routes;
use anyhow::Result;
use axum::Router;
use sovereign_common::Config;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    /// Completed runs since start or last reset
    pub run_count: AtomicU64,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            run_count: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

/// Build the router with every route group attached
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::run_routes())
        .merge(routes::health_routes())
        .merge(routes::stats_routes())
        .merge(routes::stage_routes())
        .merge(routes::lookup_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
