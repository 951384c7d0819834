//! Shared data models spanning the engine layers.

pub mod bar;
pub mod indicators;
pub mod signal;

pub use bar::{Bar, Bucket};
pub use indicators::IndicatorSnapshot;
pub use signal::{AnnotatedBucket, SignalSide};
