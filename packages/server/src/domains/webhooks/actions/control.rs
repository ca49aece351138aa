//! Admin control over outbound webhooks: connection test, manual trigger, retry

use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::{AppError, AppResult, ProjectId};
use crate::domains::projects::models::Project;
use crate::domains::webhooks::data::{
    RetryResponse, RetryWebhookInput, TestWebhookInput, TriggerResponse, TriggerWebhookInput,
};
use crate::domains::webhooks::dispatcher::{send_test, TestOutcome};
use crate::domains::webhooks::orchestrator::{retry_failed_webhook, trigger_manual};
use crate::domains::webhooks::WebhookType;
use crate::kernel::ServerDeps;

/// Look up a project by its raw id. Ids that do not parse cannot exist.
async fn load_project(raw_id: &str, deps: &ServerDeps) -> AppResult<Project> {
    let id: ProjectId = raw_id.trim().parse().map_err(|_| AppError::NotFound("Project"))?;
    Project::find_by_id_optional(id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Project"))
}

/// Post a test payload to a URL without touching any project.
pub async fn test_webhook(
    actor: &Actor,
    input: TestWebhookInput,
    deps: &ServerDeps,
) -> AppResult<TestOutcome> {
    actor.can(Capability::ManageWebhooks).check()?;

    let url = input
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("URL is required"))?;
    let secret = input.secret.as_deref().filter(|s| !s.is_empty());

    info!(url = %url, "Testing webhook connection");

    Ok(send_test(url, secret, deps).await)
}

pub async fn trigger_webhook(
    actor: &Actor,
    input: TriggerWebhookInput,
    deps: &ServerDeps,
) -> AppResult<TriggerResponse> {
    actor.can(Capability::ManageWebhooks).check()?;

    let (Some(project_id), Some(webhook_type)) = (
        input.project_id.as_deref().filter(|s| !s.is_empty()),
        input.webhook_type.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::validation(
            "projectId and webhookType are required",
        ));
    };

    let webhook_type: WebhookType = webhook_type
        .parse()
        .map_err(|_| AppError::validation("Invalid webhook type"))?;
    let project = load_project(project_id, deps).await?;

    let result = trigger_manual(&project, webhook_type, actor.user_id(), deps).await?;

    Ok(match result.webhook {
        Some(outcome) => outcome.into(),
        None => TriggerResponse {
            success: false,
            data: None,
            error: Some(format!("{} webhook was not sent", webhook_type)),
        },
    })
}

pub async fn retry_webhook(
    actor: &Actor,
    input: RetryWebhookInput,
    deps: &ServerDeps,
) -> AppResult<RetryResponse> {
    actor.can(Capability::ManageWebhooks).check()?;

    let project_id = input
        .project_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Project ID is required"))?;
    let project = load_project(project_id, deps).await?;

    let result = retry_failed_webhook(&project, deps).await?;

    Ok(RetryResponse::new(result.webhook, result.retry_count))
}
