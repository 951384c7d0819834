//! KIS REST adapter against a mock server

use intrabar::models::SignalSide;
use intrabar::services::kis::chart::{MINUTE_CHART_PATH, MINUTE_CHART_TR_ID};
use intrabar::services::kis::orders::ORDER_PATH;
use intrabar::services::kis::{KisClient, KisCredentials, KisEnvironment, KisOrderExecutor};
use intrabar::services::{FetchCursor, OrderExecutor, OrderRequest, PageRequest, UpstreamFetcher};
use intrabar::TraderError;
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::test_utils::ts;

fn credentials() -> KisCredentials {
    KisCredentials {
        app_key: "key".to_string(),
        app_secret: "secret".to_string(),
        access_token: "token".to_string(),
    }
}

fn client(server: &MockServer) -> KisClient {
    KisClient::with_base_url(server.uri(), KisEnvironment::Virtual, credentials(), "AMS")
}

fn row(ymd: &str, hms: &str, last: &str) -> serde_json::Value {
    json!({
        "xymd": ymd,
        "xhms": hms,
        "open": last,
        "high": last,
        "low": last,
        "last": last,
        "evol": "1200"
    })
}

fn request<'a>(cursor: Option<&'a FetchCursor>) -> PageRequest<'a> {
    PageRequest {
        symbol: "SOXL",
        resolution_minutes: 1,
        include_prior_session: true,
        max_rows: 120,
        cursor,
    }
}

#[tokio::test]
async fn fetches_latest_page_and_mints_cursor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .and(header("tr_id", MINUTE_CHART_TR_ID))
        .and(header("authorization", "Bearer token"))
        .and(query_param("SYMB", "SOXL"))
        .and(query_param("EXCD", "AMS"))
        .and(query_param("NREC", "120"))
        .and(query_param("NEXT", "0"))
        .and(query_param("KEYB", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "0",
            "msg_cd": "MCA00000",
            "msg1": "ok",
            "output2": [
                row("20240304", "93300", "31.10"),
                row("20240304", "093500", "31.40"),
                row("20240304", "093400", "31.20")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).fetch_page(&request(None)).await.unwrap();

    let stamps: Vec<_> = page.bars.iter().map(|b| b.timestamp).collect();
    assert_eq!(
        stamps,
        vec![ts(2024, 3, 4, 9, 35), ts(2024, 3, 4, 9, 34), ts(2024, 3, 4, 9, 33)]
    );
    assert_eq!(page.bars[0].close, dec!(31.40));
    assert_eq!(page.bars[0].volume, dec!(1200));
    assert_eq!(page.earliest(), Some(ts(2024, 3, 4, 9, 33)));
    assert_eq!(
        page.next_cursor.as_ref().map(|c| c.as_str()),
        Some("20240304093300")
    );
}

#[tokio::test]
async fn passes_cursor_as_continuation_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .and(query_param("NEXT", "1"))
        .and(query_param("KEYB", "20240304093300"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "0",
            "output2": [row("20240304", "093200", "30.90")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cursor = FetchCursor::before(ts(2024, 3, 4, 9, 33));
    let page = client(&server)
        .fetch_page(&request(Some(&cursor)))
        .await
        .unwrap();

    assert_eq!(page.bars.len(), 1);
    assert_eq!(page.bars[0].timestamp, ts(2024, 3, 4, 9, 32));
}

#[tokio::test]
async fn business_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "1",
            "msg_cd": "EGW00201",
            "msg1": "too many requests"
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_page(&request(None)).await.unwrap_err();
    assert!(matches!(err, TraderError::UpstreamTransient(ref m) if m.contains("EGW00201")));
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway down"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_page(&request(None)).await.unwrap_err();
    assert!(matches!(err, TraderError::UpstreamTransient(_)));
}

#[tokio::test]
async fn undecodable_body_is_a_shape_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_page(&request(None)).await.unwrap_err();
    assert!(matches!(err, TraderError::DataShapeMismatch(_)));
}

#[tokio::test]
async fn malformed_row_is_a_shape_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(MINUTE_CHART_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "0",
            "output2": [row("20240304", "093200", "n/a")]
        })))
        .mount(&server)
        .await;

    let err = client(&server).fetch_page(&request(None)).await.unwrap_err();
    assert!(matches!(err, TraderError::DataShapeMismatch(_)));
}

#[tokio::test]
async fn submits_virtual_buy_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ORDER_PATH))
        .and(header("tr_id", "VTTT1002U"))
        .and(body_partial_json(json!({
            "CANO": "12345678",
            "ACNT_PRDT_CD": "01",
            "OVRS_EXCG_CD": "AMEX",
            "PDNO": "SOXL",
            "ORD_QTY": "2",
            "OVRS_ORD_UNPR": "31.25",
            "ORD_DVSN": "00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "0",
            "msg_cd": "APBK0013",
            "msg1": "order accepted",
            "output": { "ODNO": "0001", "ORD_TMD": "093503" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let executor = KisOrderExecutor::new(client(&server), "12345678-01", "AMEX").unwrap();
    let confirmation = executor
        .submit(&OrderRequest {
            side: SignalSide::Buy,
            symbol: "SOXL".to_string(),
            quantity: 2,
            limit_price: dec!(31.25),
        })
        .await
        .unwrap();

    assert_eq!(confirmation.order_id, "0001");
    assert_eq!(confirmation.message, "order accepted");
}

#[tokio::test]
async fn rejected_order_is_an_order_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ORDER_PATH))
        .and(header("tr_id", "VTTT1001U"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rt_cd": "1",
            "msg_cd": "APBK0915",
            "msg1": "insufficient holdings"
        })))
        .mount(&server)
        .await;

    let executor = KisOrderExecutor::new(client(&server), "12345678", "AMEX").unwrap();
    let err = executor
        .submit(&OrderRequest {
            side: SignalSide::Sell,
            symbol: "SOXL".to_string(),
            quantity: 2,
            limit_price: dec!(30),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, TraderError::Order(ref m) if m.contains("insufficient holdings")));
}
