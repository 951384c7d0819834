use serde::{Deserialize, Serialize};

/// Indicator values attached to one bucket. `None` while an indicator is
/// still warming up (not enough history for its window).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_middle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger_lower: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_b: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedging_upper: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedging_center: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedging_lower: Option<f64>,
}
