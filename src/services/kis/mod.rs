//! Korea Investment & Securities overseas-equity REST API.

pub mod chart;
pub mod client;
pub mod messages;
pub mod orders;

pub use client::{KisClient, KisCredentials, KisEnvironment};
pub use orders::KisOrderExecutor;
