//! Unit tests for decoding KIS minute-chart rows into bars

use intrabar::models::Bar;
use intrabar::services::kis::messages::{MinuteChartResponse, MinuteChartRow};
use intrabar::TraderError;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::fixtures::session_day;

fn row(xymd: &str, xhms: &str, last: &str) -> MinuteChartRow {
    serde_json::from_value(json!({
        "xymd": xymd,
        "xhms": xhms,
        "open": "24.10",
        "high": "24.50",
        "low": "23.95",
        "last": last,
        "evol": "15230"
    }))
    .unwrap()
}

#[test]
fn row_decodes_into_a_bar() {
    let bar = Bar::try_from(&row("20240304", "093000", "24.31")).unwrap();

    assert_eq!(bar.timestamp, session_day(9, 30));
    assert_eq!(bar.open, dec!(24.10));
    assert_eq!(bar.high, dec!(24.50));
    assert_eq!(bar.low, dec!(23.95));
    assert_eq!(bar.close, dec!(24.31));
    assert_eq!(bar.volume, dec!(15230));
}

#[test]
fn short_time_field_is_zero_padded() {
    let bar = Bar::try_from(&row("20240304", "93000", "24.31")).unwrap();
    assert_eq!(bar.timestamp, session_day(9, 30));
}

#[test]
fn seconds_are_truncated_to_the_minute() {
    let bar = Bar::try_from(&row("20240304", "093059", "24.31")).unwrap();
    assert_eq!(bar.timestamp, session_day(9, 30));
}

#[test]
fn malformed_fields_are_shape_errors() {
    let bad_price = Bar::try_from(&row("20240304", "093000", "n/a"));
    assert!(matches!(bad_price, Err(TraderError::DataShapeMismatch(_))));

    let bad_date = Bar::try_from(&row("2024-03-04", "093000", "1"));
    assert!(matches!(bad_date, Err(TraderError::DataShapeMismatch(_))));
}

#[test]
fn envelope_tolerates_missing_rows() {
    let response: MinuteChartResponse =
        serde_json::from_value(json!({ "rt_cd": "1", "msg1": "rate limited" })).unwrap();

    assert!(!response.is_ok());
    assert!(response.output2.is_empty());
}

#[test]
fn row_missing_a_field_fails_to_decode() {
    let result: Result<MinuteChartRow, _> = serde_json::from_value(json!({
        "xymd": "20240304",
        "xhms": "093000"
    }));
    assert!(result.is_err());
}
