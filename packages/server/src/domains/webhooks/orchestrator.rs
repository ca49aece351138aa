//! Workflow orchestration
//!
//! Each operation applies a workflow event to a project, together with whatever the
//! event carries, and then fires the webhook the machine picked. Webhook failures are
//! reported in the returned outcome; the status change itself is already committed at
//! that point.

use serde_json::json;
use tracing::info;

use super::dispatcher::{call_webhook, WebhookOutcome};
use super::payload::WebhookPayload;
use super::{WebhookStatus, WebhookType};
use crate::common::{AppError, AppResult, UserId};
use crate::domains::clients::Client;
use crate::domains::projects::machines::{Decision, WorkflowEvent};
use crate::domains::projects::models::{ActivityAction, ActivityLog, Project, ProjectChanges};
use crate::domains::projects::status::ProjectStatus;
use crate::domains::projects::workflow::{StatusChange, Trigger};
use crate::domains::users::{User, UserRole};
use crate::kernel::ServerDeps;

pub const EDITOR_ASSIGNED_MESSAGE: &str =
    "You have been assigned a new video project. Please check your dashboard.";

/// A project after a workflow step, with the webhook that step fired (if any)
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub project: Project,
    pub webhook: Option<WebhookOutcome>,
}

impl WorkflowResult {
    fn quiet(project: Project) -> Self {
        Self {
            project,
            webhook: None,
        }
    }
}

/// Result of a webhook retry
#[derive(Debug, Clone)]
pub struct RetryResult {
    pub project: Project,
    pub webhook: WebhookOutcome,
    pub retry_count: i32,
}

// =============================================================================
// Firing
// =============================================================================

async fn load_client(project: &Project, deps: &ServerDeps) -> AppResult<Client> {
    Client::find_by_id_optional(project.client_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Client"))
}

/// Send a pipeline webhook built from the project as it is now.
pub async fn fire_pipeline(
    project: &Project,
    webhook_type: WebhookType,
    deps: &ServerDeps,
) -> AppResult<WebhookOutcome> {
    let client = load_client(project, deps).await?;
    let payload = WebhookPayload::pipeline(webhook_type, project, &client);
    Ok(call_webhook(project.id, &payload, deps).await?)
}

/// Send a notification about a project. Never touches the project's webhook status.
pub async fn send_notification(
    project: &Project,
    notification_type: &str,
    message: &str,
    deps: &ServerDeps,
) -> AppResult<WebhookOutcome> {
    let client = load_client(project, deps).await?;
    let editor = match project.editor_id {
        Some(editor_id) => User::find_by_id_optional(editor_id, &deps.db_pool).await?,
        None => None,
    };

    let payload = WebhookPayload::notification(
        project,
        &client,
        editor.as_ref(),
        notification_type,
        message,
    );
    Ok(call_webhook(project.id, &payload, deps).await?)
}

/// Fire the pipeline webhook a decision asks for and return the refreshed project.
async fn fire_decided(
    project: Project,
    decision: &Decision,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    match decision.webhook {
        Some(webhook_type) if webhook_type.is_pipeline() => {
            fire_and_reload(project, webhook_type, deps).await
        }
        _ => Ok(WorkflowResult::quiet(project)),
    }
}

async fn fire_and_reload(
    project: Project,
    webhook_type: WebhookType,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let outcome = fire_pipeline(&project, webhook_type, deps).await?;
    let project = Project::find_by_id(project.id, &deps.db_pool).await?;
    Ok(WorkflowResult {
        project,
        webhook: Some(outcome),
    })
}

/// Send a notification and pair its outcome with the project.
pub async fn notify(
    project: Project,
    notification_type: &str,
    message: &str,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let outcome = send_notification(&project, notification_type, message, deps).await?;
    Ok(WorkflowResult {
        project,
        webhook: Some(outcome),
    })
}

fn feedback_changes(feedback: &str) -> ProjectChanges {
    ProjectChanges {
        script_feedback: Some(Some(feedback.to_string())),
        ..Default::default()
    }
}

// =============================================================================
// Automated stages
// =============================================================================

/// New project: start research.
pub async fn on_project_created(project: &Project, deps: &ServerDeps) -> AppResult<WorkflowResult> {
    let (project, decision) = StatusChange::new(WorkflowEvent::ResearchStarted, Trigger::AutoWebhook)
        .apply(project, deps)
        .await?;

    info!(project_id = %project.id, "Research started");
    fire_decided(project, &decision, deps).await
}

/// Research delivered: start scripting.
pub async fn on_research_complete(
    project: &Project,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let (project, decision) =
        StatusChange::new(WorkflowEvent::ScriptingStarted, Trigger::AutoWebhook)
            .apply(project, deps)
            .await?;

    info!(project_id = %project.id, "Scripting started");
    fire_decided(project, &decision, deps).await
}

// =============================================================================
// Admin review
// =============================================================================

/// Script sent back: store the feedback and let the optimizer rework the script.
pub async fn on_script_rejected(
    project: &Project,
    feedback: &str,
    admin_id: UserId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let (project, decision) =
        StatusChange::new(WorkflowEvent::ScriptRejected, Trigger::AdminAction)
            .by(admin_id)
            .changes(feedback_changes(feedback))
            .log(
                ActivityAction::ScriptRejected,
                json!({ "feedback": feedback, "trigger": "admin_action" }),
            )
            .apply(project, deps)
            .await?;

    fire_decided(project, &decision, deps).await
}

/// Script accepted: go straight into production.
pub async fn on_script_approved(
    project: &Project,
    admin_id: UserId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let (project, decision) =
        StatusChange::new(WorkflowEvent::ScriptApproved, Trigger::AdminAction)
            .by(admin_id)
            .log(ActivityAction::ScriptApproved, json!({ "trigger": "admin_action" }))
            .apply(project, deps)
            .await?;

    fire_decided(project, &decision, deps).await
}

/// Raw video sent back: production runs again with the feedback.
pub async fn on_video_rejected(
    project: &Project,
    feedback: &str,
    admin_id: UserId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let (project, decision) =
        StatusChange::new(WorkflowEvent::VideoRejected, Trigger::AdminAction)
            .by(admin_id)
            .changes(feedback_changes(feedback))
            .log(
                ActivityAction::VideoRejected,
                json!({ "feedback": feedback, "trigger": "admin_action" }),
            )
            .apply(project, deps)
            .await?;

    fire_decided(project, &decision, deps).await
}

/// Raw video accepted: hand the project to an editor and tell them.
pub async fn on_video_approved_with_editor(
    project: &Project,
    editor_id: UserId,
    admin_id: UserId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let editor = User::find_by_id_optional(editor_id, &deps.db_pool)
        .await?
        .filter(|user| user.role == UserRole::Editor)
        .ok_or(AppError::NotFound("Editor"))?;

    let (project, _) = StatusChange::new(WorkflowEvent::VideoApproved, Trigger::AdminAction)
        .by(admin_id)
        .changes(ProjectChanges {
            editor_id: Some(editor.id),
            ..Default::default()
        })
        .log(ActivityAction::VideoApproved, json!({ "trigger": "admin_action" }))
        .log(
            ActivityAction::EditorAssigned,
            json!({ "editorId": editor.id, "editorName": editor.name }),
        )
        .apply(project, deps)
        .await?;

    info!(project_id = %project.id, editor_id = %editor.id, "Editor assigned");
    notify(project, "editor_assigned", EDITOR_ASSIGNED_MESSAGE, deps).await
}

// =============================================================================
// Recovery and manual control
// =============================================================================

/// Pipeline webhook that owns an in-progress status
fn retry_target(project: &Project) -> AppResult<WebhookType> {
    match project.status {
        ProjectStatus::ResearchInProgress => Ok(WebhookType::Research),
        ProjectStatus::ScriptInProgress if project.script_feedback.is_some() => {
            Ok(WebhookType::Optimizer)
        }
        ProjectStatus::ScriptInProgress => Ok(WebhookType::Scripting),
        ProjectStatus::ProductionInProgress => Ok(WebhookType::Production),
        status => Err(AppError::Validation(format!(
            "Cannot retry webhook in '{}' status",
            status.as_str()
        ))),
    }
}

/// Re-send the webhook behind a failed stage.
pub async fn retry_failed_webhook(project: &Project, deps: &ServerDeps) -> AppResult<RetryResult> {
    let pool = &deps.db_pool;
    let max_retries = deps.workflow.max_retries;

    if project.webhook_status != Some(WebhookStatus::Error) {
        return Err(AppError::validation("No failed webhook to retry"));
    }
    if project.retry_count >= max_retries {
        return Err(AppError::Validation(format!(
            "Maximum retries ({}) reached",
            max_retries
        )));
    }
    let webhook_type = retry_target(project)?;

    let mut tx = pool.begin().await?;
    let retry_count = Project::claim_retry(project.id, max_retries, &mut *tx)
        .await?
        .ok_or_else(|| AppError::validation("No failed webhook to retry"))?;

    ActivityLog::record(
        project.id,
        None,
        ActivityAction::WebhookRetry,
        json!({ "status": project.status }),
        &mut *tx,
    )
    .await?;
    tx.commit().await?;

    info!(
        project_id = %project.id,
        webhook_type = %webhook_type,
        retry_count,
        "Retrying webhook"
    );

    let project = Project::find_by_id(project.id, pool).await?;
    let result = fire_and_reload(project, webhook_type, deps).await?;
    let webhook = result
        .webhook
        .unwrap_or_else(|| WebhookOutcome::failed(webhook_type, "Webhook was not sent"));

    Ok(RetryResult {
        project: result.project,
        webhook,
        retry_count,
    })
}

/// Admin-triggered webhook.
///
/// A project already in the stage a webhook owns is re-fired in place; otherwise the
/// stage's start event goes through the machine first.
pub async fn trigger_manual(
    project: &Project,
    webhook_type: WebhookType,
    admin_id: UserId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResult> {
    let (owned_status, start_event) = match webhook_type {
        WebhookType::Research => (
            ProjectStatus::ResearchInProgress,
            WorkflowEvent::ResearchStarted,
        ),
        WebhookType::Scripting => (
            ProjectStatus::ScriptInProgress,
            WorkflowEvent::ScriptingStarted,
        ),
        WebhookType::Production => (
            ProjectStatus::ProductionInProgress,
            WorkflowEvent::ProductionStarted,
        ),
        WebhookType::Optimizer => {
            if project.status != ProjectStatus::ScriptInProgress {
                return Err(AppError::Conflict(format!(
                    "Cannot trigger optimizer webhook in '{}' status",
                    project.status.as_str()
                )));
            }
            return fire_and_reload(project.clone(), webhook_type, deps).await;
        }
        WebhookType::Notification => {
            return notify(
                project.clone(),
                "manual",
                "Manual notification triggered by admin",
                deps,
            )
            .await;
        }
    };

    info!(
        project_id = %project.id,
        webhook_type = %webhook_type,
        "Manual webhook trigger"
    );

    if project.status == owned_status {
        return fire_and_reload(project.clone(), webhook_type, deps).await;
    }

    let (project, decision) = StatusChange::new(start_event, Trigger::AdminAction)
        .by(admin_id)
        .apply(project, deps)
        .await?;
    fire_decided(project, &decision, deps).await
}
