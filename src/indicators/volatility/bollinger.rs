//! Bollinger Bands indicator

use serde::{Deserialize, Serialize};

use crate::indicators::math;
use crate::indicators::trend::closes;
use crate::models::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub window: usize,
    pub std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            window: 20,
            std_dev: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Middle = SMA(window), upper/lower = middle ± std_dev · σ(window).
pub fn calculate_bollinger_bands(buckets: &[Bucket], params: &BollingerParams) -> BandSeries {
    let closes = closes(buckets);
    let middle = math::rolling_mean(&closes, params.window);
    let std = math::rolling_std(&closes, params.window);

    let upper = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| Some(m.as_ref()? + params.std_dev * s.as_ref()?))
        .collect();
    let lower = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| Some(m.as_ref()? - params.std_dev * s.as_ref()?))
        .collect();

    BandSeries {
        upper,
        middle,
        lower,
    }
}

/// Position of the close inside the band: 0 at the lower band, 1 at the upper.
pub fn percent_b(buckets: &[Bucket], bands: &BandSeries) -> Vec<Option<f64>> {
    buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let upper = bands.upper.get(i).copied().flatten()?;
            let lower = bands.lower.get(i).copied().flatten()?;
            let width = upper - lower;
            if width == 0.0 {
                return None;
            }
            Some((bucket.close_f64() - lower) / width)
        })
        .collect()
}
