//! Storage contract for the bar series of one symbol.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::Bar;

/// Keyed, ordered storage of one-minute bars.
///
/// Implementations key bars by timestamp: writing a bar whose timestamp is
/// already stored replaces the previous row (last writer wins). A concurrent
/// reader observes either the old or the new row, never a mix of both.
#[async_trait]
pub trait BarStore: Send + Sync {
    /// Insert or overwrite bars by timestamp and return how many were written.
    /// Each bar is durable once the call returns; the batch as a whole is not
    /// atomic.
    async fn upsert(&self, bars: &[Bar]) -> Result<usize>;

    /// Maximum stored timestamp, `None` when the store is empty.
    async fn latest_timestamp(&self) -> Result<Option<NaiveDateTime>>;

    /// Up to `limit` most recent bars, oldest first.
    async fn query_recent(&self, limit: usize) -> Result<Vec<Bar>>;
}
