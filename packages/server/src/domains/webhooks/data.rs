use serde::{Deserialize, Serialize};

use super::dispatcher::WebhookOutcome;
use super::WebhookType;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertWebhookConfigInput {
    pub name: Option<String>,
    pub url: Option<String>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestWebhookInput {
    pub url: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerWebhookInput {
    pub project_id: Option<String>,
    pub webhook_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryWebhookInput {
    pub project_id: Option<String>,
}

/// Result of a manual trigger. Downstream failures are reported, not raised.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<WebhookOutcome> for TriggerResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        Self {
            success: outcome.success,
            data: outcome.data,
            error: outcome.error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub webhook_type: WebhookType,
    pub retry_count: i32,
}

impl RetryResponse {
    pub fn new(outcome: WebhookOutcome, retry_count: i32) -> Self {
        let message = outcome
            .success
            .then(|| format!("{} webhook retried successfully", outcome.webhook_type));
        Self {
            success: outcome.success,
            message,
            error: outcome.error,
            webhook_type: outcome.webhook_type,
            retry_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_retry_response_shapes() {
        let ok = RetryResponse::new(
            WebhookOutcome {
                webhook_type: WebhookType::Scripting,
                success: true,
                data: Some(json!({})),
                error: None,
            },
            2,
        );
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({
                "success": true,
                "message": "scripting webhook retried successfully",
                "webhookType": "scripting",
                "retryCount": 2
            })
        );

        let failed = RetryResponse::new(
            WebhookOutcome::failed(WebhookType::Production, "Webhook returned 502: Bad Gateway"),
            3,
        );
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({
                "success": false,
                "error": "Webhook returned 502: Bad Gateway",
                "webhookType": "production",
                "retryCount": 3
            })
        );
    }
}
