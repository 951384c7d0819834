//! Durable storage for the one-minute bar series.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryBarStore;
pub use postgres::PostgresBarStore;
pub use store::BarStore;
