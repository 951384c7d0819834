//! In-process bar store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::BarStore;
use crate::error::Result;
use crate::models::Bar;

/// `BTreeMap` keyed by timestamp behind an async `RwLock`. Used when no
/// database is configured and as the store in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryBarStore {
    bars: Arc<RwLock<BTreeMap<NaiveDateTime, Bar>>>,
}

impl MemoryBarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bars.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bars.read().await.is_empty()
    }
}

#[async_trait]
impl BarStore for MemoryBarStore {
    async fn upsert(&self, bars: &[Bar]) -> Result<usize> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut map = self.bars.write().await;
        for bar in bars {
            map.insert(bar.timestamp, bar.clone());
        }
        Ok(bars.len())
    }

    async fn latest_timestamp(&self) -> Result<Option<NaiveDateTime>> {
        Ok(self.bars.read().await.keys().next_back().copied())
    }

    async fn query_recent(&self, limit: usize) -> Result<Vec<Bar>> {
        let map = self.bars.read().await;
        let mut recent: Vec<Bar> = map.values().rev().take(limit).cloned().collect();
        recent.reverse();
        Ok(recent)
    }
}
