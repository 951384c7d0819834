//! Minute-chart pagination as an [`UpstreamFetcher`].

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use super::client::KisClient;
use super::messages::MinuteChartResponse;
use crate::error::{Result, TraderError};
use crate::models::Bar;
use crate::services::market_data::{BarPage, PageRequest, UpstreamFetcher};

pub const MINUTE_CHART_PATH: &str = "/uapi/overseas-price/v1/quotations/inquire-time-itemchartprice";
pub const MINUTE_CHART_TR_ID: &str = "HHDFS76950200";

#[async_trait]
impl UpstreamFetcher for KisClient {
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<BarPage> {
        let (next, keyb) = match request.cursor {
            Some(cursor) => ("1", cursor.as_str()),
            None => ("0", ""),
        };
        let nmin = request.resolution_minutes.to_string();
        let nrec = request.max_rows.to_string();
        let pinc = if request.include_prior_session { "1" } else { "0" };

        let query = [
            ("AUTH", ""),
            ("EXCD", self.exchange_code()),
            ("SYMB", request.symbol),
            ("NMIN", nmin.as_str()),
            ("PINC", pinc),
            ("NEXT", next),
            ("NREC", nrec.as_str()),
            ("FILL", ""),
            ("KEYB", keyb),
        ];

        let builder = self
            .request(Method::GET, MINUTE_CHART_PATH, MINUTE_CHART_TR_ID)
            .header("tr_cont", "")
            .query(&query);
        let response: MinuteChartResponse = self.send(builder).await?;

        if !response.is_ok() {
            return Err(TraderError::UpstreamTransient(format!(
                "rt_cd={} msg_cd={} {}",
                response.rt_cd, response.msg_cd, response.msg1
            )));
        }

        let bars = response
            .output2
            .iter()
            .map(Bar::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            symbol = %request.symbol,
            cursor = ?request.cursor.map(|c| c.as_str()),
            rows = bars.len(),
            "Fetched minute chart page"
        );

        Ok(BarPage::new(bars))
    }
}
