//! MFI (Money Flow Index) indicator

use crate::indicators::math;
use crate::models::Bucket;

/// Volume-weighted RSI analogue over typical price `(h + l + c) / 3`.
///
/// Money flow counts as positive when the typical price rose against the
/// previous bucket, negative otherwise.
pub fn calculate_mfi(buckets: &[Bucket], window: usize) -> Vec<Option<f64>> {
    let typical: Vec<f64> = buckets
        .iter()
        .map(|b| (b.high_f64() + b.low_f64() + b.close_f64()) / 3.0)
        .collect();

    let mut positive = vec![0.0; buckets.len()];
    let mut negative = vec![0.0; buckets.len()];
    for i in 1..buckets.len() {
        let flow = typical[i] * buckets[i].volume_f64();
        if typical[i - 1] < typical[i] {
            positive[i] = flow;
        } else {
            negative[i] = flow;
        }
    }

    let pos_sum = math::rolling_sum(&positive, window);
    let neg_sum = math::rolling_sum(&negative, window);

    pos_sum
        .into_iter()
        .zip(neg_sum)
        .map(|(pos, neg)| match (pos?, neg?) {
            (p, n) if p == 0.0 && n == 0.0 => None,
            (_, n) if n == 0.0 => Some(100.0),
            (p, n) => Some(100.0 - 100.0 / (1.0 + p / n)),
        })
        .collect()
}
