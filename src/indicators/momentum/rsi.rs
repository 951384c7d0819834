//! RSI (Relative Strength Index) indicator

use serde::{Deserialize, Serialize};

use crate::indicators::math;
use crate::indicators::trend::closes;
use crate::models::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    pub window: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            window: 14,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

/// RSI = 100 - (100 / (1 + RS)), RS = mean gain / mean loss over `window`
/// close-to-close changes.
///
/// A flat window has no defined RSI; a window without losses is 100.
pub fn calculate_rsi(buckets: &[Bucket], window: usize) -> Vec<Option<f64>> {
    let closes = closes(buckets);
    if closes.is_empty() {
        return Vec::new();
    }

    // First bucket has no prior close; its change is padded and masked below.
    let mut gains = vec![0.0];
    let mut losses = vec![0.0];
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gain = math::rolling_mean(&gains, window);
    let avg_loss = math::rolling_mean(&losses, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .enumerate()
        .map(|(i, (gain, loss))| {
            if i < window {
                return None;
            }
            match (gain?, loss?) {
                (g, l) if g == 0.0 && l == 0.0 => None,
                (_, l) if l == 0.0 => Some(100.0),
                (g, l) => Some(100.0 - 100.0 / (1.0 + g / l)),
            }
        })
        .collect()
}
