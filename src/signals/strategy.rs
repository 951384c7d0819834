//! Indicator overlays and the per-bucket votes derived from them.

use crate::indicators::{
    calculate_bollinger_bands, calculate_hedging_band, calculate_macd, calculate_mfi,
    calculate_rsi, percent_b, BandSeries, CrossoverType, MacdSeries,
};
use crate::models::{Bucket, IndicatorSnapshot};

use super::config::SignalConfig;

/// What the enabled strategies want at one bucket, before the holding state
/// machine decides whether it is actionable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub buy: bool,
    pub sell: bool,
}

impl Intent {
    pub const NONE: Intent = Intent {
        buy: false,
        sell: false,
    };
    pub const BUY: Intent = Intent {
        buy: true,
        sell: false,
    };
    pub const SELL: Intent = Intent {
        buy: false,
        sell: true,
    };
}

/// Every indicator series the config asks for, aligned with the buckets.
#[derive(Debug, Clone, Default)]
pub struct Overlays {
    pub macd: Option<MacdSeries>,
    pub rsi: Option<Vec<Option<f64>>>,
    pub percent_b: Option<Vec<Option<f64>>>,
    pub mfi: Option<Vec<Option<f64>>>,
    pub bollinger: BandSeries,
    pub hedging_band: BandSeries,
}

impl Overlays {
    pub fn compute(buckets: &[Bucket], config: &SignalConfig) -> Self {
        let bollinger = calculate_bollinger_bands(buckets, &config.bollinger);
        let hedging_band = calculate_hedging_band(buckets, &config.hedging_band);

        let (percent_b, mfi) = match &config.band_mfi {
            Some(params) => {
                let bands = calculate_bollinger_bands(buckets, &params.bollinger());
                (
                    Some(percent_b(buckets, &bands)),
                    Some(calculate_mfi(buckets, params.mfi_window)),
                )
            }
            None => (None, None),
        };

        Self {
            macd: config.macd.as_ref().map(|p| calculate_macd(buckets, p)),
            rsi: config.rsi.as_ref().map(|p| calculate_rsi(buckets, p.window)),
            percent_b,
            mfi,
            bollinger,
            hedging_band,
        }
    }

    pub fn snapshot(&self, i: usize) -> IndicatorSnapshot {
        let at = |series: &Option<Vec<Option<f64>>>| {
            series.as_ref().and_then(|s| s.get(i).copied().flatten())
        };
        let band = |series: &[Option<f64>]| series.get(i).copied().flatten();

        IndicatorSnapshot {
            macd: self.macd.as_ref().and_then(|m| m.macd.get(i).copied()),
            macd_signal: self.macd.as_ref().and_then(|m| m.signal.get(i).copied()),
            rsi: at(&self.rsi),
            bollinger_upper: band(&self.bollinger.upper),
            bollinger_middle: band(&self.bollinger.middle),
            bollinger_lower: band(&self.bollinger.lower),
            percent_b: at(&self.percent_b),
            mfi: at(&self.mfi),
            hedging_upper: band(&self.hedging_band.upper),
            hedging_center: band(&self.hedging_band.middle),
            hedging_lower: band(&self.hedging_band.lower),
        }
    }

    /// Union of the enabled strategies' votes at bucket `i`.
    pub fn intent_at(&self, i: usize, config: &SignalConfig) -> Intent {
        let mut intent = Intent::NONE;

        if let Some(macd) = &self.macd {
            match macd.crossover_at(i) {
                CrossoverType::Bullish => intent.buy = true,
                CrossoverType::Bearish => intent.sell = true,
                CrossoverType::None => {}
            }
        }

        let rsi = self.rsi.as_ref().and_then(|r| r.get(i).copied().flatten());
        if let (Some(params), Some(rsi)) = (&config.rsi, rsi) {
            if rsi <= params.oversold {
                intent.buy = true;
            } else if rsi >= params.overbought {
                intent.sell = true;
            }
        }

        if let Some(params) = &config.band_mfi {
            let pb = self.percent_b.as_ref().and_then(|s| s.get(i).copied().flatten());
            let mfi = self.mfi.as_ref().and_then(|s| s.get(i).copied().flatten());
            if let (Some(pb), Some(mfi)) = (pb, mfi) {
                if pb < params.percent_b_low && mfi < params.mfi_low {
                    intent.buy = true;
                } else if pb > params.percent_b_high && mfi > params.mfi_high {
                    intent.sell = true;
                }
            }
        }

        intent
    }
}
