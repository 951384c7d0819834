//! Overseas limit-order routing.

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use super::client::{KisClient, KisEnvironment};
use super::messages::{OrderBody, OrderResponse};
use crate::error::{Result, TraderError};
use crate::models::SignalSide;
use crate::services::orders::{OrderConfirmation, OrderExecutor, OrderRequest};

pub const ORDER_PATH: &str = "/uapi/overseas-stock/v1/trading/order";

/// US-market transaction ids per environment and side.
pub fn order_tr_id(environment: KisEnvironment, side: SignalSide) -> &'static str {
    match (environment, side) {
        (KisEnvironment::Production, SignalSide::Buy) => "TTTT1002U",
        (KisEnvironment::Production, SignalSide::Sell) => "TTTT1006U",
        (KisEnvironment::Virtual, SignalSide::Buy) => "VTTT1002U",
        (KisEnvironment::Virtual, SignalSide::Sell) => "VTTT1001U",
    }
}

#[derive(Debug, Clone)]
pub struct KisOrderExecutor {
    client: KisClient,
    /// 8-digit account number.
    account: String,
    /// 2-digit product code.
    product_code: String,
    /// Order exchange code (`NASD`, `NYSE`, `AMEX`).
    order_exchange: String,
}

impl KisOrderExecutor {
    /// `account` is either `CANO-PRDT` or the bare 8-digit number, in which
    /// case the product code defaults to `01`.
    pub fn new(client: KisClient, account: &str, order_exchange: impl Into<String>) -> Result<Self> {
        let (cano, product) = match account.split_once('-') {
            Some((cano, product)) => (cano.trim(), product.trim()),
            None => (account.trim(), "01"),
        };
        if cano.is_empty() || product.is_empty() {
            return Err(TraderError::Config(format!("invalid account number {:?}", account)));
        }
        Ok(Self {
            client,
            account: cano.to_string(),
            product_code: product.to_string(),
            order_exchange: order_exchange.into(),
        })
    }
}

#[async_trait]
impl OrderExecutor for KisOrderExecutor {
    async fn submit(&self, order: &OrderRequest) -> Result<OrderConfirmation> {
        let body = OrderBody {
            cano: self.account.clone(),
            acnt_prdt_cd: self.product_code.clone(),
            ovrs_excg_cd: self.order_exchange.clone(),
            pdno: order.symbol.clone(),
            ord_qty: order.quantity.to_string(),
            ovrs_ord_unpr: order.limit_price.round_dp(2).to_string(),
            ord_svr_dvsn_cd: "0".to_string(),
            ord_dvsn: "00".to_string(),
        };
        let tr_id = order_tr_id(self.client.environment(), order.side);

        let builder = self.client.request(Method::POST, ORDER_PATH, tr_id).json(&body);
        let response: OrderResponse = self
            .client
            .send(builder)
            .await
            .map_err(|e| TraderError::Order(e.to_string()))?;

        if response.rt_cd != "0" {
            return Err(TraderError::Order(format!(
                "rt_cd={} msg_cd={} {}",
                response.rt_cd, response.msg_cd, response.msg1
            )));
        }

        let order_id = response.output.map(|o| o.odno).unwrap_or_default();
        info!(side = %order.side, symbol = %order.symbol, order_id = %order_id, "Order accepted");
        Ok(OrderConfirmation {
            order_id,
            message: response.msg1,
        })
    }
}
