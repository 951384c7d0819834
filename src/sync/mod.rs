//! Keeps the stored bar series caught up with the upstream feed.

pub mod gap_filler;

pub use gap_filler::{BackfillOutcome, BackfillReport, GapFiller, GapFillerConfig};
