//! Order submission interface.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::error::Result;
use crate::models::SignalSide;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub side: SignalSide,
    pub symbol: String,
    pub quantity: u32,
    pub limit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub message: String,
}

/// Receives resolved signals. Results are only logged by the caller.
#[async_trait]
pub trait OrderExecutor: Send + Sync {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation>;
}

/// Accepts every order without routing it anywhere.
#[derive(Debug, Default)]
pub struct PaperOrderExecutor {
    next_id: AtomicU64,
}

impl PaperOrderExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderExecutor for PaperOrderExecutor {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            side = %order.side,
            symbol = %order.symbol,
            quantity = order.quantity,
            limit_price = %order.limit_price,
            "Paper order accepted"
        );
        Ok(OrderConfirmation {
            order_id: format!("paper-{}", id),
            message: "paper order accepted".to_string(),
        })
    }
}
