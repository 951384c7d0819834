//! Full recomputation of overlays and signals over a bucket series.

use chrono::{Duration, NaiveDateTime};
use std::num::NonZeroU32;
use tracing::debug;

use crate::models::{AnnotatedBucket, Bucket, SignalSide};

use super::config::SignalConfig;
use super::state::{SignalState, Transition};
use super::strategy::Overlays;

#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
    /// Span of one bucket; decides which bucket reaches the exit cutoff.
    bucket_width: Duration,
}

/// Annotated series plus the holding state left after the last bucket.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub buckets: Vec<AnnotatedBucket>,
    pub final_state: SignalState,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Self {
        Self {
            config,
            bucket_width: Duration::minutes(1),
        }
    }

    pub fn with_bucket_minutes(mut self, minutes: NonZeroU32) -> Self {
        self.bucket_width = Duration::minutes(i64::from(minutes.get()));
        self
    }

    pub fn bucket_width(&self) -> Duration {
        self.bucket_width
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Stateless across calls: state is rebuilt from idle on every run.
    pub fn evaluate(&self, buckets: &[Bucket]) -> Evaluation {
        let overlays = Overlays::compute(buckets, &self.config);
        let mut state = SignalState::new();
        let mut annotated = Vec::with_capacity(buckets.len());

        for (i, bucket) in buckets.iter().enumerate() {
            let intent = overlays.intent_at(i, &self.config);
            let transition = state.step(
                bucket.start,
                self.bucket_width,
                bucket.close_f64(),
                intent,
                &self.config.session,
            );

            let (buy_signal, sell_signal, forced_exit) = match transition {
                Transition::Enter => (true, false, false),
                Transition::Exit { forced } => (false, true, forced),
                Transition::None => (false, false, false),
            };
            if transition != Transition::None {
                debug!(start = %bucket.start, ?transition, close = %bucket.close, "Signal transition");
            }

            annotated.push(AnnotatedBucket {
                bucket: bucket.clone(),
                indicators: overlays.snapshot(i),
                buy_signal,
                sell_signal,
                forced_exit,
                peak_since_entry: state.peak_price_since_entry,
            });
        }

        Evaluation {
            buckets: annotated,
            final_state: state,
        }
    }
}

impl Evaluation {
    pub fn latest(&self) -> Option<&AnnotatedBucket> {
        self.buckets.last()
    }

    /// The last bucket's signal, only when that bucket starts at `now_minute`.
    pub fn current_signal(&self, now_minute: NaiveDateTime) -> Option<SignalSide> {
        self.latest()
            .filter(|b| b.bucket.start == now_minute)
            .and_then(AnnotatedBucket::signal)
    }

    /// Every bucket carrying a signal, oldest first.
    pub fn signals(&self) -> impl Iterator<Item = &AnnotatedBucket> {
        self.buckets.iter().filter(|b| b.buy_signal || b.sell_signal)
    }
}
