//! Volatility indicators: Bollinger Bands, hedging band

pub mod bollinger;
pub mod hedging_band;

pub use bollinger::*;
pub use hedging_band::*;
