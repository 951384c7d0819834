//! Indicator series computed over resampled buckets.
//!
//! Every function returns one value per input bucket so overlays line up
//! index-for-index with the series; warm-up positions are `None`.

pub mod math;

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use momentum::*;
pub use trend::*;
pub use volatility::*;
