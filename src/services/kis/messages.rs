//! Wire shapes of the KIS REST responses and request bodies.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TraderError;
use crate::models::Bar;

/// `inquire-time-itemchartprice` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct MinuteChartResponse {
    pub rt_cd: String,
    #[serde(default)]
    pub msg_cd: String,
    #[serde(default)]
    pub msg1: String,
    #[serde(default)]
    pub output2: Vec<MinuteChartRow>,
}

impl MinuteChartResponse {
    pub fn is_ok(&self) -> bool {
        self.rt_cd == "0"
    }
}

/// One minute row. Every field arrives as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct MinuteChartRow {
    /// Local date, `YYYYMMDD`.
    pub xymd: String,
    /// Local time, `HHMMSS`; leading zeros may be dropped.
    pub xhms: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub last: String,
    pub evol: String,
}

impl TryFrom<&MinuteChartRow> for Bar {
    type Error = TraderError;

    fn try_from(row: &MinuteChartRow) -> Result<Self, Self::Error> {
        let date = NaiveDate::parse_from_str(row.xymd.trim(), "%Y%m%d")
            .map_err(|e| shape(format!("bad xymd {:?}: {}", row.xymd, e)))?;
        let hms = format!("{:0>6}", row.xhms.trim());
        let time = NaiveTime::parse_from_str(&hms, "%H%M%S")
            .map_err(|e| shape(format!("bad xhms {:?}: {}", row.xhms, e)))?;

        Ok(Bar::new(
            crate::session::truncate_to_minute(NaiveDateTime::new(date, time)),
            decimal("open", &row.open)?,
            decimal("high", &row.high)?,
            decimal("low", &row.low)?,
            decimal("last", &row.last)?,
            decimal("evol", &row.evol)?,
        ))
    }
}

fn decimal(field: &str, raw: &str) -> Result<Decimal, TraderError> {
    Decimal::from_str(raw.trim()).map_err(|e| shape(format!("bad {} {:?}: {}", field, raw, e)))
}

fn shape(msg: String) -> TraderError {
    TraderError::DataShapeMismatch(msg)
}

/// Overseas limit order body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct OrderBody {
    pub cano: String,
    pub acnt_prdt_cd: String,
    pub ovrs_excg_cd: String,
    pub pdno: String,
    pub ord_qty: String,
    pub ovrs_ord_unpr: String,
    pub ord_svr_dvsn_cd: String,
    pub ord_dvsn: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub rt_cd: String,
    #[serde(default)]
    pub msg_cd: String,
    #[serde(default)]
    pub msg1: String,
    pub output: Option<OrderOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderOutput {
    #[serde(rename = "ODNO", default)]
    pub odno: String,
    #[serde(rename = "ORD_TMD", default)]
    pub ord_tmd: String,
}
