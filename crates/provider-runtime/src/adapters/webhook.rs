//! Slack-compatible webhook alerter.

use std::time::Duration;

use async_trait::async_trait;
use ep_03_ingestor::{AlertError, Alerter, LogAlerter};
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": message}` to a webhook URL.
#[derive(Clone)]
pub struct WebhookAlerter {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlerter {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, AlertError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::Delivery(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Alerter for WebhookAlerter {
    async fn send_alert(&self, message: &str) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .map_err(|e| AlertError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AlertError::Delivery(format!("webhook returned HTTP {status}")));
        }
        debug!("[runtime] Alert delivered to webhook");
        Ok(())
    }
}

/// The alert channel chosen by configuration.
pub enum RuntimeAlerter {
    Log(LogAlerter),
    Webhook(WebhookAlerter),
}

impl RuntimeAlerter {
    /// Webhook when a URL is configured, log-only otherwise.
    pub fn from_config(webhook_url: Option<&str>, timeout: Duration) -> Result<Self, AlertError> {
        match webhook_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Ok(Self::Webhook(WebhookAlerter::new(url, timeout)?)),
            None => Ok(Self::Log(LogAlerter)),
        }
    }
}

#[async_trait]
impl Alerter for RuntimeAlerter {
    async fn send_alert(&self, message: &str) -> Result<(), AlertError> {
        match self {
            Self::Log(alerter) => alerter.send_alert(message).await,
            Self::Webhook(alerter) => alerter.send_alert(message).await,
        }
    }
}
