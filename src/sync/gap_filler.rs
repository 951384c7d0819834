//! Downtime gap detection and paginated backfill.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::db::BarStore;
use crate::error::Result;
use crate::metrics::Metrics;
use crate::models::Bar;
use crate::services::market_data::{FetchCursor, PageRequest, UpstreamFetcher};
use crate::session::{Clock, SessionClock};

#[derive(Debug, Clone)]
pub struct GapFillerConfig {
    pub symbol: String,
    pub resolution_minutes: u32,
    pub include_prior_session: bool,
    /// Upstream page size limit.
    pub max_per_page: usize,
    /// History fetched when the store is empty.
    pub bootstrap_minutes: usize,
    /// Delay between two page fetches of one pass.
    pub pacing: Duration,
    /// Delay between two passes.
    pub pass_delay: Duration,
}

impl Default for GapFillerConfig {
    fn default() -> Self {
        Self {
            symbol: "SOXL".to_string(),
            resolution_minutes: 1,
            include_prior_session: true,
            max_per_page: 120,
            bootstrap_minutes: 2400,
            pacing: Duration::from_millis(500),
            pass_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// No minutes missing between the latest stored bar and now.
    UpToDate,
    /// The feed ran out of data before the gap closed. Not an error.
    Exhausted,
    /// The stop flag was raised between page fetches.
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    pub passes: u32,
    pub pages_fetched: u32,
    /// Bars strictly newer than the latest timestamp seen at the start of
    /// their pass.
    pub bars_added: usize,
    pub outcome: BackfillOutcome,
}

#[derive(Debug, Default)]
struct PassSummary {
    pages: u32,
    added: usize,
    up_to_date: bool,
    exhausted: bool,
    stopped: bool,
}

pub struct GapFiller {
    config: GapFillerConfig,
    store: Arc<dyn BarStore>,
    fetcher: Arc<dyn UpstreamFetcher>,
    clock: Arc<dyn Clock>,
    session: SessionClock,
    stop: Arc<AtomicBool>,
    metrics: Option<Arc<Metrics>>,
}

impl GapFiller {
    pub fn new(
        config: GapFillerConfig,
        store: Arc<dyn BarStore>,
        fetcher: Arc<dyn UpstreamFetcher>,
        clock: Arc<dyn Clock>,
        session: SessionClock,
    ) -> Self {
        Self {
            config,
            store,
            fetcher,
            clock,
            session,
            stop: Arc::new(AtomicBool::new(false)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Share an externally owned stop flag.
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn config(&self) -> &GapFillerConfig {
        &self.config
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Minutes between the latest stored bar and the current local minute,
    /// `None` when the store is empty.
    pub async fn missing_minutes(&self) -> Result<Option<i64>> {
        let latest = self.store.latest_timestamp().await?;
        Ok(latest.map(|l| self.minutes_since(l)))
    }

    fn now_minute(&self) -> NaiveDateTime {
        self.session.local_minute(self.clock.now_utc())
    }

    fn minutes_since(&self, latest: NaiveDateTime) -> i64 {
        (self.now_minute() - latest).num_minutes()
    }

    /// Run passes until the gap is closed, the feed is exhausted or the stop
    /// flag is raised. Storage and upstream failures end the run.
    pub async fn run(&self) -> Result<BackfillReport> {
        let mut report = BackfillReport {
            passes: 0,
            pages_fetched: 0,
            bars_added: 0,
            outcome: BackfillOutcome::UpToDate,
        };

        loop {
            if self.is_stopped() {
                report.outcome = BackfillOutcome::Stopped;
                break;
            }

            let pass = self.run_pass().await?;
            report.passes += 1;
            report.pages_fetched += pass.pages;
            report.bars_added += pass.added;
            if let Some(metrics) = &self.metrics {
                metrics.backfill_passes_total.inc();
            }

            if pass.stopped {
                report.outcome = BackfillOutcome::Stopped;
                break;
            }
            if pass.up_to_date {
                report.outcome = BackfillOutcome::UpToDate;
                break;
            }
            if pass.exhausted || pass.added == 0 {
                report.outcome = match self.missing_minutes().await? {
                    Some(missing) if missing <= 0 => BackfillOutcome::UpToDate,
                    _ => BackfillOutcome::Exhausted,
                };
                break;
            }

            tokio::time::sleep(self.config.pass_delay).await;
        }

        if let (Some(metrics), Some(missing)) = (&self.metrics, self.missing_minutes().await?) {
            metrics.latest_bar_lag_minutes.set(missing.max(0) as f64);
        }

        info!(
            symbol = %self.config.symbol,
            passes = report.passes,
            pages = report.pages_fetched,
            bars_added = report.bars_added,
            outcome = ?report.outcome,
            "Backfill finished"
        );
        Ok(report)
    }

    async fn run_pass(&self) -> Result<PassSummary> {
        let mut summary = PassSummary::default();
        let latest = self.store.latest_timestamp().await?;

        let target = match latest {
            None => {
                info!(
                    symbol = %self.config.symbol,
                    bootstrap_minutes = self.config.bootstrap_minutes,
                    "Store empty, bootstrapping history"
                );
                self.config.bootstrap_minutes
            }
            Some(latest) => {
                let missing = self.minutes_since(latest);
                if missing <= 0 {
                    summary.up_to_date = true;
                    return Ok(summary);
                }
                info!(symbol = %self.config.symbol, missing_minutes = missing, "Gap detected");
                missing as usize
            }
        };

        let page_size = self.config.max_per_page.max(1);
        let required_pages = target.div_ceil(page_size);
        let mut cursor: Option<FetchCursor> = None;
        let mut seen: BTreeSet<NaiveDateTime> = BTreeSet::new();

        for page_no in 0..required_pages {
            if page_no > 0 {
                tokio::time::sleep(self.config.pacing).await;
            }
            if self.is_stopped() {
                summary.stopped = true;
                break;
            }

            let request = PageRequest {
                symbol: &self.config.symbol,
                resolution_minutes: self.config.resolution_minutes,
                include_prior_session: self.config.include_prior_session,
                max_rows: page_size,
                cursor: cursor.as_ref(),
            };
            let page = self.fetcher.fetch_page(&request).await?;
            summary.pages += 1;
            if let Some(metrics) = &self.metrics {
                metrics.backfill_pages_total.inc();
            }

            let Some(earliest) = page.earliest() else {
                debug!(symbol = %self.config.symbol, page = page_no + 1, "Upstream returned an empty page");
                summary.exhausted = true;
                break;
            };

            let mut fresh: Vec<Bar> = page
                .bars
                .iter()
                .filter(|bar| seen.insert(bar.timestamp))
                .cloned()
                .collect();
            fresh.sort_by_key(|bar| bar.timestamp);

            let written = self.store.upsert(&fresh).await?;
            if let Some(metrics) = &self.metrics {
                metrics.bars_upserted_total.inc_by(written as u64);
            }
            summary.added += fresh
                .iter()
                .filter(|bar| latest.map_or(true, |l| bar.timestamp > l))
                .count();

            debug!(
                symbol = %self.config.symbol,
                page = page_no + 1,
                of = required_pages,
                rows = page.bars.len(),
                written,
                earliest = %earliest,
                "Backfill page stored"
            );

            if page.bars.len() < page_size {
                summary.exhausted = true;
                break;
            }
            if latest.is_some_and(|l| earliest <= l) {
                break;
            }
            cursor = Some(page.next_cursor.unwrap_or_else(|| FetchCursor::before(earliest)));
        }

        if summary.stopped {
            warn!(symbol = %self.config.symbol, pages = summary.pages, "Backfill stopped between pages");
        }
        Ok(summary)
    }
}
