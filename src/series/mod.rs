//! Views derived from the stored bar series.

pub mod resample;

pub use resample::{aggregate, BucketOrigin};
