//! Authenticated HTTP plumbing shared by the chart feed and order routing.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraderError};

pub const PRODUCTION_URL: &str = "https://openapi.koreainvestment.com:9443";
pub const VIRTUAL_URL: &str = "https://openapivts.koreainvestment.com:29443";

/// Real-money or paper-trading endpoint family. Selects both the base URL
/// and the transaction ids sent with orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KisEnvironment {
    Production,
    Virtual,
}

impl KisEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            KisEnvironment::Production => PRODUCTION_URL,
            KisEnvironment::Virtual => VIRTUAL_URL,
        }
    }
}

#[derive(Clone)]
pub struct KisCredentials {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
}

impl std::fmt::Debug for KisCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KisCredentials")
            .field("app_key", &"<redacted>")
            .field("app_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct KisClient {
    http: reqwest::Client,
    base_url: String,
    environment: KisEnvironment,
    credentials: KisCredentials,
    /// Exchange code used by quotation endpoints (`NAS`, `NYS`, `AMS`).
    exchange_code: String,
}

impl KisClient {
    pub fn new(environment: KisEnvironment, credentials: KisCredentials, exchange_code: impl Into<String>) -> Self {
        Self::with_base_url(environment.base_url(), environment, credentials, exchange_code)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        environment: KisEnvironment,
        credentials: KisCredentials,
        exchange_code: impl Into<String>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            environment,
            credentials,
            exchange_code: exchange_code.into(),
        }
    }

    pub fn environment(&self) -> KisEnvironment {
        self.environment
    }

    pub fn exchange_code(&self) -> &str {
        &self.exchange_code
    }

    pub(crate) fn request(&self, method: Method, path: &str, tr_id: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("content-type", "application/json; charset=utf-8")
            .header("authorization", format!("Bearer {}", self.credentials.access_token))
            .header("appkey", &self.credentials.app_key)
            .header("appsecret", &self.credentials.app_secret)
            .header("tr_id", tr_id)
            .header("custtype", "P")
    }

    /// Sends the request and decodes the JSON envelope. Transport errors and
    /// non-2xx statuses are transient; an undecodable body is a shape error.
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TraderError::UpstreamTransient(format!(
                "HTTP {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| TraderError::DataShapeMismatch(format!("failed to decode response: {}", e)))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
