//! Deterministic OHLCV aggregation of one-minute bars into wider buckets.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

use crate::models::{Bar, Bucket};

/// Where bucket boundaries are counted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketOrigin {
    /// Rolling aggregation: boundaries start at the first bar.
    FirstBar,
    /// Wall-clock grid: boundaries start at midnight of the first bar's day,
    /// so 15-minute buckets land on :00/:15/:30/:45.
    Clock,
    /// Explicitly pinned origin.
    At(NaiveDateTime),
}

impl BucketOrigin {
    fn resolve(&self, first: NaiveDateTime) -> NaiveDateTime {
        match self {
            BucketOrigin::FirstBar => first,
            BucketOrigin::Clock => first.date().and_hms_opt(0, 0, 0).unwrap_or(first),
            BucketOrigin::At(origin) => *origin,
        }
    }
}

/// Aggregate an ascending bar series into buckets of `width_minutes`.
///
/// A bar lands in bucket `floor((timestamp - origin) / width)`. Bars sharing
/// an index merge as first open, max high, min low, last close, summed
/// volume. Empty buckets are not emitted.
pub fn aggregate(series: &[Bar], width_minutes: NonZeroU32, origin: BucketOrigin) -> Vec<Bucket> {
    let Some(first) = series.first() else {
        return Vec::new();
    };

    let origin = origin.resolve(first.timestamp);
    let width = i64::from(width_minutes.get());

    let mut aggregated: Vec<Bucket> = Vec::new();
    let mut current_index: Option<i64> = None;

    for bar in series {
        let offset = (bar.timestamp - origin).num_seconds();
        let index = offset.div_euclid(width * 60);

        match aggregated.last_mut() {
            Some(bucket) if current_index == Some(index) => bucket.merge(bar),
            _ => {
                let start = origin + Duration::minutes(index * width);
                aggregated.push(Bucket::open_with(start, bar));
                current_index = Some(index);
            }
        }
    }

    aggregated
}
