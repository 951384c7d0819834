//! Bucket-level signal evaluation.

pub mod config;
pub mod engine;
pub mod state;
pub mod strategy;

pub use config::{BandMfiParams, SignalConfig};
pub use engine::{Evaluation, SignalEngine};
pub use state::{SignalState, Transition};
pub use strategy::{Intent, Overlays};
