//! EMA (Exponential Moving Average) indicator

use crate::indicators::math;
use crate::models::Bucket;

pub fn closes(buckets: &[Bucket]) -> Vec<f64> {
    buckets.iter().map(Bucket::close_f64).collect()
}

/// EMA of closes for a span. Defined from the first bucket onward.
pub fn calculate_ema(buckets: &[Bucket], span: usize) -> Vec<f64> {
    math::ema(&closes(buckets), span)
}
