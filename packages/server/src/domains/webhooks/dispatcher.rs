//! Outbound webhook dispatch
//!
//! Resolves where a webhook goes, sends it and records the outcome on the project and in
//! its activity log. A failed webhook is an outcome, not an error: callers only see `Err`
//! when the database is unavailable.

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::models::WebhookConfig;
use super::payload::{test_payload, WebhookPayload};
use super::WebhookType;
use crate::common::utils::truncate_chars;
use crate::common::ProjectId;
use crate::domains::projects::models::{ActivityAction, ActivityLog, Project};
use crate::kernel::ServerDeps;

const LOGGED_URL_CHARS: usize = 50;
const STORED_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,
    pub secret: Option<String>,
}

/// Where a webhook goes: an active stored config wins over the environment fallback.
pub async fn resolve_target(
    webhook_type: WebhookType,
    deps: &ServerDeps,
) -> Result<Option<WebhookTarget>> {
    let config = WebhookConfig::find_by_name(webhook_type, &deps.db_pool).await?;
    Ok(pick_target(webhook_type, config.as_ref(), deps))
}

fn pick_target(
    webhook_type: WebhookType,
    config: Option<&WebhookConfig>,
    deps: &ServerDeps,
) -> Option<WebhookTarget> {
    let url = config
        .and_then(|c| c.active_url())
        .or_else(|| deps.workflow.webhook_urls.get(webhook_type))?;

    let secret = config
        .and_then(|c| c.secret.as_deref())
        .filter(|s| !s.is_empty())
        .or(deps.workflow.webhook_secret.as_deref());

    Some(WebhookTarget {
        url: url.to_string(),
        secret: secret.map(str::to_string),
    })
}

/// Result of one webhook call, as reported to API callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookOutcome {
    pub webhook_type: WebhookType,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookOutcome {
    pub fn failed(webhook_type: WebhookType, error: impl Into<String>) -> Self {
        Self {
            webhook_type,
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

fn logged_url(url: &str) -> String {
    format!("{}...", truncate_chars(url, LOGGED_URL_CHARS))
}

/// Send a webhook for a project.
///
/// Pipeline webhooks update `webhook_status` / `webhook_error` / `last_webhook_type`;
/// notifications only leave activity entries.
pub async fn call_webhook(
    project_id: ProjectId,
    payload: &WebhookPayload,
    deps: &ServerDeps,
) -> Result<WebhookOutcome> {
    let pool = &deps.db_pool;
    let webhook_type = payload.webhook_type;
    let tracked = webhook_type.is_pipeline();

    if tracked {
        Project::mark_webhook_pending(project_id, webhook_type, pool).await?;
    }

    let Some(target) = resolve_target(webhook_type, deps).await? else {
        let error = format!("No URL configured for {} webhook", webhook_type);
        warn!(project_id = %project_id, webhook_type = %webhook_type, "{}", error);
        ActivityLog::record(
            project_id,
            None,
            ActivityAction::WebhookFailed,
            json!({ "type": webhook_type, "error": error }),
            pool,
        )
        .await?;
        if tracked {
            Project::mark_webhook_error(project_id, &error, pool).await?;
        }
        return Ok(WebhookOutcome::failed(webhook_type, error));
    };

    ActivityLog::record(
        project_id,
        None,
        ActivityAction::WebhookCalled,
        json!({ "type": webhook_type, "url": logged_url(&target.url) }),
        pool,
    )
    .await?;

    info!(project_id = %project_id, webhook_type = %webhook_type, "Calling webhook");

    let body = serde_json::to_value(payload)?;
    let response = deps
        .webhook_client
        .post_json(&target.url, target.secret.as_deref(), &body)
        .await;

    match response {
        Ok(response) if response.is_success() => {
            let data = serde_json::from_str(&response.body).unwrap_or_else(|_| json!({}));
            ActivityLog::record(
                project_id,
                None,
                ActivityAction::WebhookSuccess,
                json!({ "type": webhook_type }),
                pool,
            )
            .await?;
            if tracked {
                Project::mark_webhook_success(project_id, pool).await?;
            }

            info!(project_id = %project_id, webhook_type = %webhook_type, "Webhook succeeded");

            Ok(WebhookOutcome {
                webhook_type,
                success: true,
                data: Some(data),
                error: None,
            })
        }
        Ok(response) => {
            let short = truncate_chars(&response.body, STORED_ERROR_CHARS);
            ActivityLog::record(
                project_id,
                None,
                ActivityAction::WebhookFailed,
                json!({ "type": webhook_type, "status": response.status, "error": short }),
                pool,
            )
            .await?;
            if tracked {
                let stored = format!("{}: {} - {}", webhook_type, response.status, short);
                Project::mark_webhook_error(project_id, &stored, pool).await?;
            }

            warn!(
                project_id = %project_id,
                webhook_type = %webhook_type,
                status = response.status,
                "Webhook returned an error status"
            );

            Ok(WebhookOutcome::failed(
                webhook_type,
                format!("Webhook returned {}: {}", response.status, response.body),
            ))
        }
        Err(e) => {
            let message = e.to_string();
            ActivityLog::record(
                project_id,
                None,
                ActivityAction::WebhookFailed,
                json!({ "type": webhook_type, "error": message }),
                pool,
            )
            .await?;
            if tracked {
                let stored = format!("{}: {}", webhook_type, message);
                Project::mark_webhook_error(project_id, &stored, pool).await?;
            }

            warn!(
                project_id = %project_id,
                webhook_type = %webhook_type,
                error = %message,
                "Webhook request failed"
            );

            Ok(WebhookOutcome::failed(webhook_type, message))
        }
    }
}

/// Outcome of a connection test
#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Send a test payload to an arbitrary URL. Nothing is recorded.
pub async fn send_test(url: &str, secret: Option<&str>, deps: &ServerDeps) -> TestOutcome {
    match deps.webhook_client.post_json(url, secret, &test_payload()).await {
        Ok(response) if response.is_success() => TestOutcome {
            success: true,
            error: None,
        },
        Ok(response) => TestOutcome {
            success: false,
            error: Some(format!(
                "Webhook returned {}: {}",
                response.status,
                truncate_chars(&response.body, STORED_ERROR_CHARS)
            )),
        },
        Err(e) => TestOutcome {
            success: false,
            error: Some(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::WebhookConfigId;
    use crate::config::{WebhookUrls, WorkflowSettings};
    use crate::kernel::TestDependencies;
    use chrono::Utc;

    fn deps_with(workflow: WorkflowSettings) -> ServerDeps {
        // Lazy pool: never connects, these tests do not touch the database
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        TestDependencies::new().workflow(workflow).into_server_deps(pool)
    }

    fn config(url: &str, secret: Option<&str>, is_active: bool) -> WebhookConfig {
        WebhookConfig {
            id: WebhookConfigId::new(),
            name: WebhookType::Research,
            url: url.to_string(),
            secret: secret.map(str::to_string),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn env_settings() -> WorkflowSettings {
        WorkflowSettings {
            webhook_urls: WebhookUrls {
                research: Some("https://env.example.com/research".to_string()),
                ..Default::default()
            },
            webhook_secret: Some("env-secret".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_active_config_wins() {
        let deps = deps_with(env_settings());
        let stored = config("https://db.example.com/research", Some("db-secret"), true);

        let target = pick_target(WebhookType::Research, Some(&stored), &deps).unwrap();
        assert_eq!(target.url, "https://db.example.com/research");
        assert_eq!(target.secret.as_deref(), Some("db-secret"));
    }

    #[tokio::test]
    async fn test_inactive_or_empty_config_falls_back_to_env() {
        let deps = deps_with(env_settings());

        for stored in [
            config("https://db.example.com/research", None, false),
            config("", None, true),
        ] {
            let target = pick_target(WebhookType::Research, Some(&stored), &deps).unwrap();
            assert_eq!(target.url, "https://env.example.com/research");
            assert_eq!(target.secret.as_deref(), Some("env-secret"));
        }
    }

    #[tokio::test]
    async fn test_stored_secret_applies_even_when_url_comes_from_env() {
        let deps = deps_with(env_settings());
        let stored = config("", Some("db-secret"), true);

        let target = pick_target(WebhookType::Research, Some(&stored), &deps).unwrap();
        assert_eq!(target.url, "https://env.example.com/research");
        assert_eq!(target.secret.as_deref(), Some("db-secret"));
    }

    #[tokio::test]
    async fn test_no_url_anywhere() {
        let deps = deps_with(WorkflowSettings::default());
        assert!(pick_target(WebhookType::Scripting, None, &deps).is_none());
    }

    #[test]
    fn test_logged_url_is_truncated() {
        let url = format!("https://n8n.example.com/webhook/{}", "x".repeat(80));
        let logged = logged_url(&url);
        assert_eq!(logged.chars().count(), 53);
        assert!(logged.ends_with("..."));
    }
}
