//! Intraday bar maintenance and signal engine for a single listed security.
//!
//! The crate keeps a deduplicated one-minute bar series in a [`db::BarStore`],
//! backfills downtime gaps from a paginated upstream feed, resamples the
//! series into coarser buckets and derives buy/sell signals from them.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod series;
pub mod services;
pub mod session;
pub mod signals;
pub mod sync;

pub use error::{Result, TraderError};
