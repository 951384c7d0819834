//! Fire-and-forget text alerts.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::{Result, TraderError};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Send and swallow: notification failures are logged, never propagated.
pub async fn notify(notifier: &dyn Notifier, text: &str) {
    if let Err(e) = notifier.send(text).await {
        warn!(error = %e, message = %text, "Notification failed");
    }
}

/// Posts `{"content": text}` to a Discord webhook.
pub struct DiscordNotifier {
    http: reqwest::Client,
    webhook_url: String,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(webhook_url, reqwest::Client::new())
    }

    pub fn with_client(webhook_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "content": text }))
            .send()
            .await
            .map_err(|e| TraderError::Notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TraderError::Notify(format!("webhook returned {}: {}", status, body)));
        }

        info!(message = %text, "Discord message sent");
        Ok(())
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        info!(message = %text, "Notification");
        Ok(())
    }
}
