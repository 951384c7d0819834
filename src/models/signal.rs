use serde::{Deserialize, Serialize};
use std::fmt;

use super::bar::Bucket;
use super::indicators::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSide {
    Buy,
    Sell,
}

impl SignalSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSide::Buy => "buy",
            SignalSide::Sell => "sell",
        }
    }
}

impl fmt::Display for SignalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bucket together with its indicator overlay and signal flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedBucket {
    pub bucket: Bucket,
    pub indicators: IndicatorSnapshot,
    pub buy_signal: bool,
    pub sell_signal: bool,
    /// Set when the sell was forced by the session-end cutoff.
    pub forced_exit: bool,
    /// Highest close seen since the open entry, while holding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_since_entry: Option<f64>,
}

impl AnnotatedBucket {
    pub fn signal(&self) -> Option<SignalSide> {
        if self.buy_signal {
            Some(SignalSide::Buy)
        } else if self.sell_signal {
            Some(SignalSide::Sell)
        } else {
            None
        }
    }
}
