//! Prometheus metrics for the backfill, analysis and HTTP surfaces.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

use crate::models::SignalSide;

pub struct Metrics {
    registry: Registry,
    pub bars_upserted_total: IntCounter,
    pub backfill_pages_total: IntCounter,
    pub backfill_passes_total: IntCounter,
    pub cycle_failures_total: IntCounter,
    pub signals_emitted_total: IntCounterVec,
    pub latest_bar_lag_minutes: Gauge,
    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("intrabar".to_string()), None)?;

        let bars_upserted_total =
            IntCounter::new("bars_upserted_total", "Bars written to the bar store")?;
        let backfill_pages_total =
            IntCounter::new("backfill_pages_total", "Upstream pages fetched by the gap filler")?;
        let backfill_passes_total =
            IntCounter::new("backfill_passes_total", "Gap filler passes completed")?;
        let cycle_failures_total =
            IntCounter::new("cycle_failures_total", "Runtime cycles that ended in an error")?;
        let signals_emitted_total = IntCounterVec::new(
            Opts::new("signals_emitted_total", "Fresh signals surfaced to the executor"),
            &["side"],
        )?;
        let latest_bar_lag_minutes = Gauge::new(
            "latest_bar_lag_minutes",
            "Minutes between now and the latest stored bar after a backfill",
        )?;
        let http_requests_total = IntCounter::new("http_requests_total", "HTTP requests served")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently being served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;

        registry.register(Box::new(bars_upserted_total.clone()))?;
        registry.register(Box::new(backfill_pages_total.clone()))?;
        registry.register(Box::new(backfill_passes_total.clone()))?;
        registry.register(Box::new(cycle_failures_total.clone()))?;
        registry.register(Box::new(signals_emitted_total.clone()))?;
        registry.register(Box::new(latest_bar_lag_minutes.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            bars_upserted_total,
            backfill_pages_total,
            backfill_passes_total,
            cycle_failures_total,
            signals_emitted_total,
            latest_bar_lag_minutes,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
        })
    }

    pub fn record_signal(&self, side: SignalSide) {
        self.signals_emitted_total
            .with_label_values(&[side.as_str()])
            .inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
