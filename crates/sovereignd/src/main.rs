//! Sovereign Daemon - serves the executive recovery demo over HTTP.

use anyhow::Result;
use sovereign_common::Config;
use sovereignd::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Sovereign Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    if config.llm.enabled {
        info!("  Local model enabled: {} at {}", config.llm.model, config.llm.endpoint);
    } else {
        info!("  Local model disabled, runs use simulated reasoning");
    }

    server::run(config).await
}
