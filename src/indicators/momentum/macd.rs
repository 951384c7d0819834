//! MACD (Moving Average Convergence Divergence) indicator

use serde::{Deserialize, Serialize};

use crate::indicators::math;
use crate::indicators::trend::closes;
use crate::models::Bucket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast_span: usize,
    pub slow_span: usize,
    pub signal_span: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            signal_span: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    Bullish,
    Bearish,
    None,
}

/// MACD = EMA(fast) - EMA(slow), signal = EMA(signal) of MACD.
pub fn calculate_macd(buckets: &[Bucket], params: &MacdParams) -> MacdSeries {
    let closes = closes(buckets);
    let fast = math::ema(&closes, params.fast_span);
    let slow = math::ema(&closes, params.slow_span);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = math::ema(&macd, params.signal_span);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

impl MacdSeries {
    /// Crossover between bucket `i - 1` and bucket `i`.
    ///
    /// Bullish when MACD moves from strictly below the signal line to
    /// strictly above it, bearish for the reverse.
    pub fn crossover_at(&self, i: usize) -> CrossoverType {
        if i == 0 || i >= self.macd.len() {
            return CrossoverType::None;
        }
        let (prev_macd, prev_signal) = (self.macd[i - 1], self.signal[i - 1]);
        let (macd, signal) = (self.macd[i], self.signal[i]);

        if prev_macd < prev_signal && macd > signal {
            CrossoverType::Bullish
        } else if prev_macd > prev_signal && macd < signal {
            CrossoverType::Bearish
        } else {
            CrossoverType::None
        }
    }
}
