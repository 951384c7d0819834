//! One-shot analysis: backfill the series once, evaluate it and print the
//! annotated buckets as JSON lines.

use dotenvy::dotenv;
use intrabar::config::{RunMode, TraderConfig};
use intrabar::core::build_runtime;
use intrabar::logging;
use intrabar::metrics::Metrics;
use intrabar::session::{Clock, SystemClock};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let mut config = TraderConfig::from_env()?;
    config.run_mode = RunMode::Analyze;

    let tail = config.analyze_tail;

    info!(symbol = %config.symbol(), tail = tail, "Running one-shot analysis");

    let metrics = Arc::new(Metrics::new()?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let runtime = build_runtime(&config, clock, metrics).await?;

    let evaluation = runtime.run_once().await?;
    let skip = evaluation.buckets.len().saturating_sub(tail);
    for bucket in evaluation.buckets.iter().skip(skip) {
        println!("{}", serde_json::to_string(bucket)?);
    }

    Ok(())
}
