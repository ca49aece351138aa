use serde::{Deserialize, Serialize};

/// Outbound automation workflows the server can call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "webhook_type", rename_all = "lowercase")]
pub enum WebhookType {
    Research,
    Scripting,
    Optimizer,
    Production,
    Notification,
}

impl WebhookType {
    pub const ALL: [WebhookType; 5] = [
        WebhookType::Research,
        WebhookType::Scripting,
        WebhookType::Optimizer,
        WebhookType::Production,
        WebhookType::Notification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookType::Research => "research",
            WebhookType::Scripting => "scripting",
            WebhookType::Optimizer => "optimizer",
            WebhookType::Production => "production",
            WebhookType::Notification => "notification",
        }
    }

    /// Pipeline webhooks drive a stage; their outcome is tracked on the project.
    pub fn is_pipeline(&self) -> bool {
        !matches!(self, WebhookType::Notification)
    }
}

impl std::fmt::Display for WebhookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WebhookType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        WebhookType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Invalid webhook type: {}", s))
    }
}

/// Outcome of the last pipeline webhook on a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "webhook_status", rename_all = "lowercase")]
pub enum WebhookStatus {
    Pending,
    Success,
    Error,
}

impl std::fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookStatus::Pending => write!(f, "pending"),
            WebhookStatus::Success => write!(f, "success"),
            WebhookStatus::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_type_round_trips_through_str() {
        for webhook_type in WebhookType::ALL {
            assert_eq!(webhook_type.as_str().parse::<WebhookType>().unwrap(), webhook_type);
            assert_eq!(
                serde_json::to_value(webhook_type).unwrap(),
                serde_json::json!(webhook_type.as_str())
            );
        }
        assert!("Research".parse::<WebhookType>().is_err());
    }

    #[test]
    fn test_only_notification_is_not_pipeline() {
        assert!(!WebhookType::Notification.is_pipeline());
        assert!(WebhookType::Research.is_pipeline());
        assert!(WebhookType::Optimizer.is_pipeline());
    }
}
