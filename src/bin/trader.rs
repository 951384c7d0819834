//! Intrabar trader
//!
//! Runs the session-driven polling loop (backfill, analysis, signal dispatch)
//! next to the health/metrics HTTP server.

use dotenvy::dotenv;
use intrabar::config::TraderConfig;
use intrabar::core::{build_runtime, start_server, AppState};
use intrabar::logging;
use intrabar::metrics::Metrics;
use intrabar::session::{Clock, SystemClock};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = TraderConfig::from_env()?;
    info!("Starting intrabar trader");
    info!(
        environment = %config.environment,
        symbol = %config.symbol(),
        run_mode = %config.run_mode,
        bucket_minutes = config.bucket_minutes.get(),
        "Configuration loaded"
    );

    let metrics = Arc::new(Metrics::new()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let runtime = build_runtime(&config, clock, metrics.clone()).await?;

    let state = AppState::new(metrics, runtime.status());
    let port = config.http_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, stopping...");
        }
        let _ = shutdown_tx.send(true);
    });

    runtime.run(shutdown_rx).await?;

    server_handle.abort();
    info!("Trader stopped");
    Ok(())
}
