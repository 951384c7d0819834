//! Upstream bar feed interface.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::fmt;

use crate::error::Result;
use crate::models::Bar;

/// Pagination token meaning "bars strictly before this point".
///
/// The feed treats it as opaque text; it is minted from the earliest
/// timestamp of the previous page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchCursor(String);

impl FetchCursor {
    pub const FORMAT: &'static str = "%Y%m%d%H%M%S";

    pub fn before(timestamp: NaiveDateTime) -> Self {
        Self(timestamp.format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, Self::FORMAT).ok()
    }
}

impl fmt::Display for FetchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct PageRequest<'a> {
    pub symbol: &'a str,
    pub resolution_minutes: u32,
    pub include_prior_session: bool,
    pub max_rows: usize,
    /// `None` asks for the most recent page.
    pub cursor: Option<&'a FetchCursor>,
}

/// One page of bars, newest first. An empty page means the feed has
/// nothing older to give.
#[derive(Debug, Clone, Default)]
pub struct BarPage {
    pub bars: Vec<Bar>,
    pub next_cursor: Option<FetchCursor>,
}

impl BarPage {
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let next_cursor = bars.last().map(|b| FetchCursor::before(b.timestamp));
        Self { bars, next_cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn earliest(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.timestamp)
    }
}

/// Backward-paginating source of native-resolution bars.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<BarPage>;
}
