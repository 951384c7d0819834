//! Process-level orchestration: the polling runtime and its HTTP surface.

pub mod bootstrap;
pub mod http;
pub mod runtime;

pub use bootstrap::build_runtime;
pub use http::{create_router, start_server, AppState, HealthStatus};
pub use runtime::{
    poll_interval, Announcement, AnnouncementState, RuntimeSettings, RuntimeStatus, SignalRecord,
    TradingRuntime,
};
