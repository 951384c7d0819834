use serde::{Deserialize, Serialize};

use crate::indicators::{BollingerParams, HedgingBandParams, MacdParams, RsiParams};
use crate::session::SessionHours;

/// %B + money-flow confirmation thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandMfiParams {
    pub band_window: usize,
    pub band_k: f64,
    pub mfi_window: usize,
    pub percent_b_low: f64,
    pub percent_b_high: f64,
    pub mfi_low: f64,
    pub mfi_high: f64,
}

impl Default for BandMfiParams {
    fn default() -> Self {
        Self {
            band_window: 10,
            band_k: 2.0,
            mfi_window: 10,
            percent_b_low: 0.2,
            percent_b_high: 0.8,
            mfi_low: 20.0,
            mfi_high: 80.0,
        }
    }
}

impl BandMfiParams {
    pub fn bollinger(&self) -> BollingerParams {
        BollingerParams {
            window: self.band_window,
            std_dev: self.band_k,
        }
    }
}

/// Strategy selection and thresholds. A `None` strategy never votes.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub macd: Option<MacdParams>,
    pub rsi: Option<RsiParams>,
    pub band_mfi: Option<BandMfiParams>,
    /// Overlay-only channels.
    pub bollinger: BollingerParams,
    pub hedging_band: HedgingBandParams,
    pub session: SessionHours,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            macd: Some(MacdParams::default()),
            rsi: None,
            band_mfi: None,
            bollinger: BollingerParams::default(),
            hedging_band: HedgingBandParams::default(),
            session: SessionHours::default(),
        }
    }
}

impl SignalConfig {
    pub fn with_macd(mut self, params: Option<MacdParams>) -> Self {
        self.macd = params;
        self
    }

    pub fn with_rsi(mut self, params: Option<RsiParams>) -> Self {
        self.rsi = params;
        self
    }

    pub fn with_band_mfi(mut self, params: Option<BandMfiParams>) -> Self {
        self.band_mfi = params;
        self
    }

    pub fn with_session(mut self, session: SessionHours) -> Self {
        self.session = session;
        self
    }
}
