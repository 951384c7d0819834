//! Error taxonomy shared by the storage, upstream and glue layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraderError {
    /// Persistence backend unreachable or a write was rejected.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Network, timeout or rate-limit failure talking to the upstream feed.
    #[error("upstream request failed: {0}")]
    UpstreamTransient(String),

    /// The upstream answered but the page could not be decoded into bars.
    #[error("upstream page malformed: {0}")]
    DataShapeMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("order rejected: {0}")]
    Order(String),
}

impl TraderError {
    /// Upstream failures are retried by the outer loop on its next cycle.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TraderError::UpstreamTransient(_) | TraderError::DataShapeMismatch(_)
        )
    }
}

impl From<tokio_postgres::Error> for TraderError {
    fn from(e: tokio_postgres::Error) -> Self {
        TraderError::StorageUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for TraderError {
    fn from(e: reqwest::Error) -> Self {
        TraderError::UpstreamTransient(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TraderError>;
