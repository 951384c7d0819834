//! Hedging band: the envelope of Keltner, Bollinger and Donchian channels.

use serde::{Deserialize, Serialize};

use crate::indicators::math;
use crate::indicators::trend::closes;
use crate::models::Bucket;

use super::bollinger::BandSeries;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgingBandParams {
    pub keltner_span: usize,
    pub range_window: usize,
    pub channel_window: usize,
    pub multiplier: f64,
}

impl Default for HedgingBandParams {
    fn default() -> Self {
        Self {
            keltner_span: 21,
            range_window: 14,
            channel_window: 21,
            multiplier: 2.0,
        }
    }
}

/// Upper = max of the three upper bands, lower = min of the three lower
/// bands, middle = mean of the three centre lines.
pub fn calculate_hedging_band(buckets: &[Bucket], params: &HedgingBandParams) -> BandSeries {
    let closes = closes(buckets);
    let highs: Vec<f64> = buckets.iter().map(Bucket::high_f64).collect();
    let lows: Vec<f64> = buckets.iter().map(Bucket::low_f64).collect();
    let ranges: Vec<f64> = highs.iter().zip(&lows).map(|(h, l)| h - l).collect();

    let kc_mid = math::ema(&closes, params.keltner_span);
    let kc_range = math::rolling_mean(&ranges, params.range_window);
    let bb_mid = math::rolling_mean(&closes, params.channel_window);
    let bb_std = math::rolling_std(&closes, params.channel_window);
    let dc_upper = math::rolling_max(&highs, params.channel_window);
    let dc_lower = math::rolling_min(&lows, params.channel_window);

    let k = params.multiplier;
    let mut band = BandSeries::default();
    for i in 0..buckets.len() {
        let parts = kc_range[i].zip(bb_mid[i]).zip(bb_std[i]).zip(dc_upper[i].zip(dc_lower[i]));
        match parts {
            Some((((range, sma), std), (dc_hi, dc_lo))) => {
                let kc_upper = kc_mid[i] + k * range;
                let kc_lower = kc_mid[i] - k * range;
                let bb_upper = sma + k * std;
                let bb_lower = sma - k * std;

                band.upper.push(Some(kc_upper.max(bb_upper).max(dc_hi)));
                band.lower.push(Some(kc_lower.min(bb_lower).min(dc_lo)));
                band.middle.push(Some((kc_mid[i] + sma + (dc_hi + dc_lo) / 2.0) / 3.0));
            }
            None => {
                band.upper.push(None);
                band.middle.push(None);
                band.lower.push(None);
            }
        }
    }
    band
}
