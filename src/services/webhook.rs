use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::config::AppConfig;
use crate::models::classification::WebhookPayload;

/// Header carrying the shared secret expected by the webhook receiver.
pub const SECRET_HEADER: &str = "x-webhook-secret";

/// Destination for classification results.
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, payload: &WebhookPayload) -> Result<(), WebhookError>;
}

/// Posts results to the configured HTTP webhook. No retries.
pub struct WebhookClient {
    http: Client,
    url: Option<String>,
    secret: Option<String>,
}

impl WebhookClient {
    pub fn new(
        url: Option<String>,
        secret: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WebhookError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(WebhookError::Http)?;

        Ok(Self {
            http,
            url: url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
            secret,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, WebhookError> {
        Self::new(
            config.webhook_url.clone(),
            config.webhook_secret.clone(),
            Duration::from_secs(config.webhook_timeout_secs),
        )
    }
}

#[async_trait]
impl ResultPublisher for WebhookClient {
    async fn publish(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let url = self.url.as_deref().ok_or(WebhookError::MissingUrl)?;

        // `.json()` sets `Content-Type: application/json`.
        let mut request = self.http.post(url).json(payload);
        if let Some(secret) = &self.secret {
            request = request.header(SECRET_HEADER, secret);
        }

        let response = request.send().await.map_err(WebhookError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::Status(status));
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing WEBHOOK_URL")]
    MissingUrl,

    #[error("Webhook request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Webhook responded with {0}")]
    Status(StatusCode),
}

impl WebhookError {
    pub fn is_config(&self) -> bool {
        matches!(self, WebhookError::MissingUrl)
    }
}
