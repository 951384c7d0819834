//! Session-driven polling loop: pre-open backfill, per-minute analysis,
//! open/close announcements and signal dispatch.

use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

use crate::config::{RunMode, TraderConfig};
use crate::db::BarStore;
use crate::error::{Result, TraderError};
use crate::metrics::Metrics;
use crate::models::{AnnotatedBucket, SignalSide};
use crate::series::{aggregate, BucketOrigin};
use crate::services::notifier::{notify, Notifier};
use crate::services::orders::{OrderExecutor, OrderRequest};
use crate::session::{truncate_to_minute, Clock, SessionClock, SessionPhase};
use crate::signals::{Evaluation, SignalEngine};
use crate::sync::{BackfillOutcome, BackfillReport, GapFiller};

/// Knobs the loop needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub symbol: String,
    pub run_mode: RunMode,
    pub bucket_minutes: NonZeroU32,
    pub bucket_origin: BucketOrigin,
    pub raw_limit: usize,
    pub trigger_second: u32,
    pub order_quantity: u32,
    pub preopen_retries: usize,
}

impl From<&TraderConfig> for RuntimeSettings {
    fn from(config: &TraderConfig) -> Self {
        Self {
            symbol: config.symbol().to_string(),
            run_mode: config.run_mode,
            bucket_minutes: config.bucket_minutes,
            bucket_origin: config.bucket_origin,
            raw_limit: config.raw_limit,
            trigger_second: config.trigger_second,
            order_quantity: config.order_quantity,
            preopen_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    PreOpen,
    MarketOpen,
    MarketClosed,
}

/// One-shot flags per session, owned by the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnouncementState {
    pub preopen_done: bool,
    pub open_announced: bool,
    pub close_announced: bool,
}

impl AnnouncementState {
    /// Announcement due for this phase, if any. Entering a phase re-arms the
    /// flags of the opposite one.
    pub fn observe(&mut self, phase: SessionPhase, after_close: bool) -> Option<Announcement> {
        match phase {
            SessionPhase::PreOpen if !self.preopen_done => {
                self.preopen_done = true;
                self.close_announced = false;
                Some(Announcement::PreOpen)
            }
            SessionPhase::Regular if !self.open_announced => {
                self.open_announced = true;
                self.close_announced = false;
                Some(Announcement::MarketOpen)
            }
            SessionPhase::Closed if after_close && !self.close_announced => {
                self.close_announced = true;
                self.open_announced = false;
                self.preopen_done = false;
                Some(Announcement::MarketClosed)
            }
            _ => None,
        }
    }
}

/// How long the loop sleeps in a given phase.
pub fn poll_interval(phase: SessionPhase, after_close: bool) -> Duration {
    match phase {
        SessionPhase::Regular => Duration::from_millis(500),
        SessionPhase::Closed if after_close => Duration::from_secs(60),
        _ => Duration::from_secs(1),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRecord {
    pub side: SignalSide,
    pub bucket_start: NaiveDateTime,
    pub price: Decimal,
    pub forced_exit: bool,
}

/// Snapshot served on `/status`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeStatus {
    pub symbol: String,
    pub run_mode: String,
    pub phase: Option<SessionPhase>,
    pub latest_bar: Option<NaiveDateTime>,
    pub last_backfill: Option<BackfillReport>,
    pub last_signal: Option<SignalRecord>,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct TradingRuntime {
    settings: RuntimeSettings,
    store: Arc<dyn BarStore>,
    gap_filler: GapFiller,
    engine: SignalEngine,
    session: SessionClock,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    executor: Arc<dyn OrderExecutor>,
    metrics: Arc<Metrics>,
    status: Arc<RwLock<RuntimeStatus>>,
}

impl TradingRuntime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: RuntimeSettings,
        store: Arc<dyn BarStore>,
        gap_filler: GapFiller,
        engine: SignalEngine,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
        executor: Arc<dyn OrderExecutor>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let engine = engine.with_bucket_minutes(settings.bucket_minutes);
        let session = SessionClock::new(engine.config().session);
        let status = RuntimeStatus {
            symbol: settings.symbol.clone(),
            run_mode: settings.run_mode.to_string(),
            ..RuntimeStatus::default()
        };
        Self {
            settings,
            store,
            gap_filler,
            engine,
            session,
            clock,
            notifier,
            executor,
            metrics,
            status: Arc::new(RwLock::new(status)),
        }
    }

    pub fn status(&self) -> Arc<RwLock<RuntimeStatus>> {
        self.status.clone()
    }

    pub fn session(&self) -> &SessionClock {
        &self.session
    }

    /// One gap-filler run; the result is recorded on the status.
    pub async fn backfill(&self) -> Result<BackfillReport> {
        let report = self.gap_filler.run().await?;
        let latest = self.store.latest_timestamp().await?;
        let mut status = self.status.write().await;
        status.latest_bar = latest;
        status.last_backfill = Some(report.clone());
        Ok(report)
    }

    /// Pre-open backfill with bounded exponential backoff.
    pub async fn backfill_with_retry(&self) -> Result<BackfillReport> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(30))
            .with_max_times(self.settings.preopen_retries);

        (|| async { self.backfill().await })
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|e: &TraderError| {
                !self.gap_filler.is_stopped()
                    && (e.is_upstream() || matches!(e, TraderError::StorageUnavailable(_)))
            })
            .notify(|e: &TraderError, after: Duration| {
                warn!(error = %e, retry_in_ms = after.as_millis() as u64, "Backfill failed, retrying");
            })
            .await
    }

    /// Load recent bars, resample and evaluate.
    pub async fn analyze(&self) -> Result<Evaluation> {
        let bars = self.store.query_recent(self.settings.raw_limit).await?;
        let buckets = aggregate(&bars, self.settings.bucket_minutes, self.settings.bucket_origin);
        Ok(self.engine.evaluate(&buckets))
    }

    /// Backfill, evaluate, and dispatch the fresh signal if there is one.
    pub async fn run_cycle(&self) -> Result<Option<SignalSide>> {
        if self.backfill().await?.outcome == BackfillOutcome::Stopped {
            return Ok(None);
        }
        let evaluation = self.analyze().await?;
        let now_minute = self.session.local_minute(self.clock.now_utc());

        self.status.write().await.last_cycle_at = Some(self.clock.now_utc());

        let Some(side) = evaluation.current_signal(now_minute) else {
            return Ok(None);
        };
        if let Some(bucket) = evaluation.latest() {
            self.dispatch(side, bucket).await;
        }
        Ok(Some(side))
    }

    /// Backfill and evaluate once, logging every signal in the window.
    pub async fn run_once(&self) -> Result<Evaluation> {
        self.backfill().await?;
        let evaluation = self.analyze().await?;
        for bucket in evaluation.signals() {
            info!(
                start = %bucket.bucket.start,
                close = %bucket.bucket.close,
                buy = bucket.buy_signal,
                sell = bucket.sell_signal,
                forced_exit = bucket.forced_exit,
                "Signal"
            );
        }
        info!(
            buckets = evaluation.buckets.len(),
            holding = evaluation.final_state.holding,
            "Analysis complete"
        );
        Ok(evaluation)
    }

    async fn dispatch(&self, side: SignalSide, bucket: &AnnotatedBucket) {
        self.metrics.record_signal(side);
        let record = SignalRecord {
            side,
            bucket_start: bucket.bucket.start,
            price: bucket.bucket.close,
            forced_exit: bucket.forced_exit,
        };
        self.status.write().await.last_signal = Some(record.clone());

        let suffix = if record.forced_exit { " (session exit)" } else { "" };
        let text = format!(
            "{} {} signal at {} ({}){}",
            self.settings.symbol,
            side.as_str().to_uppercase(),
            record.price,
            record.bucket_start.format("%Y-%m-%d %H:%M"),
            suffix
        );
        info!(side = %side, price = %record.price, forced_exit = record.forced_exit, "Fresh signal");
        notify(self.notifier.as_ref(), &text).await;

        if self.settings.run_mode == RunMode::Analyze {
            return;
        }

        let order = OrderRequest {
            side,
            symbol: self.settings.symbol.clone(),
            quantity: self.settings.order_quantity,
            limit_price: record.price,
        };
        match self.executor.submit(&order).await {
            Ok(confirmation) => info!(
                order_id = %confirmation.order_id,
                message = %confirmation.message,
                "Order submitted"
            ),
            Err(e) => {
                error!(error = %e, side = %side, "Order submission failed");
                notify(self.notifier.as_ref(), &format!("Order failed: {}", e)).await;
            }
        }
    }

    async fn announce(&self, announcement: Announcement) {
        let text = match announcement {
            Announcement::PreOpen => format!("{} pre-open: syncing bars", self.settings.symbol),
            Announcement::MarketOpen => format!("{} regular session open", self.settings.symbol),
            Announcement::MarketClosed => format!("{} regular session closed", self.settings.symbol),
        };
        info!(?announcement, "Session announcement");
        notify(self.notifier.as_ref(), &text).await;
    }

    async fn record_failure(&self, e: &TraderError) {
        self.metrics.cycle_failures_total.inc();
        error!(error = %e, "Cycle failed");
        self.status.write().await.last_error = Some(e.to_string());
        notify(self.notifier.as_ref(), &format!("{} cycle failed: {}", self.settings.symbol, e)).await;
    }

    /// Drive `work` to completion. A shutdown request raises the gap filler's
    /// stop flag so an in-flight backfill ends between pages.
    async fn until_shutdown<F, T>(&self, work: F, shutdown: &mut watch::Receiver<bool>) -> T
    where
        F: Future<Output = T>,
    {
        tokio::pin!(work);
        loop {
            tokio::select! {
                out = &mut work => return out,
                changed = shutdown.changed(), if !self.gap_filler.is_stopped() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping backfill");
                        self.gap_filler.stop();
                    }
                }
            }
        }
    }

    /// Poll until `shutdown` flips. A failed cycle is logged and notified;
    /// the loop keeps going.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut announcements = AnnouncementState::default();
        let mut last_cycle_minute: Option<NaiveDateTime> = None;

        info!(
            symbol = %self.settings.symbol,
            run_mode = %self.settings.run_mode,
            "Trading runtime started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = self.clock.now_utc();
            let phase = self.session.phase(now);
            let after_close = self.session.is_after_close(now);
            self.status.write().await.phase = Some(phase);

            if let Some(announcement) = announcements.observe(phase, after_close) {
                self.announce(announcement).await;
                if announcement == Announcement::PreOpen {
                    let backfill = self.backfill_with_retry();
                    if let Err(e) = self.until_shutdown(backfill, &mut shutdown).await {
                        self.record_failure(&e).await;
                    }
                }
            }

            if phase == SessionPhase::Regular {
                let local = self.session.local(now);
                let minute = truncate_to_minute(local);
                if local.second() >= self.settings.trigger_second && last_cycle_minute != Some(minute) {
                    last_cycle_minute = Some(minute);
                    if let Err(e) = self.until_shutdown(self.run_cycle(), &mut shutdown).await {
                        self.record_failure(&e).await;
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(poll_interval(phase, after_close)) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.gap_filler.stop();
        info!("Trading runtime stopped");
        Ok(())
    }
}
