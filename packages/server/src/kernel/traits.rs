// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// What gets sent, and what a response means for a project, lives in the webhooks domain.
//
// Naming convention: Base* for trait names (e.g., BaseWebhookClient)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Webhook Trait (Infrastructure - outbound automation calls)
// =============================================================================

/// Raw HTTP outcome of a webhook call. Any status code is a response, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookHttpResponse {
    pub status: u16,
    pub body: String,
}

impl WebhookHttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait BaseWebhookClient: Send + Sync {
    /// POST a JSON payload, sending `X-Webhook-Secret` when a secret is given.
    ///
    /// Errors only on transport failure (DNS, connect, timeout).
    async fn post_json(
        &self,
        url: &str,
        secret: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<WebhookHttpResponse>;
}
