use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{BaseWebhookClient, WebhookHttpResponse};

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";

/// reqwest-backed webhook client
pub struct HttpWebhookClient {
    client: Client,
}

impl HttpWebhookClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build webhook HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BaseWebhookClient for HttpWebhookClient {
    async fn post_json(
        &self,
        url: &str,
        secret: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<WebhookHttpResponse> {
        let mut request = self.client.post(url).json(payload);
        if let Some(secret) = secret {
            request = request.header(WEBHOOK_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        debug!(status = status, "Webhook responded");

        Ok(WebhookHttpResponse { status, body })
    }
}
