//! Review and editing steps
//!
//! Each action authorizes, checks its input and hands the project to the workflow; an
//! action applied in the wrong status fails with the transition error (409).

use serde_json::json;
use tracing::info;

use super::load_project;
use crate::common::auth::{Actor, Capability};
use crate::common::utils::is_valid_url;
use crate::common::{AppError, AppResult, ProjectId, UserId};
use crate::domains::projects::data::{
    EditorInput, FeedbackInput, SubmitFinalInput, WorkflowResponse,
};
use crate::domains::projects::machines::WorkflowEvent;
use crate::domains::projects::models::{ActivityAction, ActivityLog, Project, ProjectChanges};
use crate::domains::projects::workflow::{StatusChange, Trigger};
use crate::domains::users::{User, UserRole};
use crate::domains::webhooks::orchestrator::{
    notify, on_script_approved, on_script_rejected, on_video_approved_with_editor,
    on_video_rejected, WorkflowResult,
};
use crate::kernel::ServerDeps;

pub const FINAL_SUBMITTED_MESSAGE: &str = "Final video has been submitted for review.";
pub const PROJECT_COMPLETED_MESSAGE: &str = "Project has been completed.";

impl From<WorkflowResult> for WorkflowResponse {
    fn from(result: WorkflowResult) -> Self {
        Self {
            project: result.project.into(),
            webhook: result.webhook,
        }
    }
}

fn quiet(project: Project) -> WorkflowResponse {
    WorkflowResponse {
        project: project.into(),
        webhook: None,
    }
}

fn required_feedback(input: FeedbackInput) -> AppResult<String> {
    input
        .feedback
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::validation("Feedback is required"))
}

fn trigger_for(actor: &Actor) -> Trigger {
    if actor.is_admin() {
        Trigger::AdminAction
    } else {
        Trigger::EditorAction
    }
}

// =============================================================================
// Admin review
// =============================================================================

pub async fn approve_script(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let project = load_project(project_id, deps).await?;

    Ok(on_script_approved(&project, actor.user_id(), deps).await?.into())
}

pub async fn reject_script(
    actor: &Actor,
    project_id: ProjectId,
    input: FeedbackInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let feedback = required_feedback(input)?;
    let project = load_project(project_id, deps).await?;

    Ok(on_script_rejected(&project, &feedback, actor.user_id(), deps)
        .await?
        .into())
}

pub async fn approve_video(
    actor: &Actor,
    project_id: ProjectId,
    input: EditorInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let editor_id = input
        .editor_id
        .ok_or_else(|| AppError::validation("Editor is required"))?;
    let project = load_project(project_id, deps).await?;

    Ok(
        on_video_approved_with_editor(&project, editor_id, actor.user_id(), deps)
            .await?
            .into(),
    )
}

pub async fn reject_video(
    actor: &Actor,
    project_id: ProjectId,
    input: FeedbackInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let feedback = required_feedback(input)?;
    let project = load_project(project_id, deps).await?;

    Ok(on_video_rejected(&project, &feedback, actor.user_id(), deps)
        .await?
        .into())
}

/// Assign or reassign the editor without touching the status.
pub async fn assign_editor(
    actor: &Actor,
    project_id: ProjectId,
    input: EditorInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let editor_id: UserId = input
        .editor_id
        .ok_or_else(|| AppError::validation("Editor is required"))?;
    let project = load_project(project_id, deps).await?;

    let editor = User::find_by_id_optional(editor_id, &deps.db_pool)
        .await?
        .filter(|user| user.role == UserRole::Editor)
        .ok_or_else(|| AppError::validation("Invalid editor"))?;

    let mut tx = deps.db_pool.begin().await?;
    let project = Project::set_editor(project.id, editor.id, &mut *tx).await?;
    ActivityLog::record(
        project.id,
        Some(actor.user_id()),
        ActivityAction::EditorAssigned,
        json!({ "editorId": editor.id, "editorName": editor.name }),
        &mut *tx,
    )
    .await?;
    tx.commit().await?;

    info!(project_id = %project.id, editor_id = %editor.id, "Editor assigned");

    Ok(quiet(project))
}

/// Send a final cut back to the editor.
pub async fn request_changes(
    actor: &Actor,
    project_id: ProjectId,
    input: FeedbackInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let feedback = required_feedback(input)?;
    let project = load_project(project_id, deps).await?;

    let (project, _) = StatusChange::new(WorkflowEvent::ChangesRequested, Trigger::AdminAction)
        .by(actor.user_id())
        .log(ActivityAction::ChangesRequested, json!({ "feedback": feedback }))
        .apply(&project, deps)
        .await?;

    Ok(notify(project, "changes_requested", &feedback, deps)
        .await?
        .into())
}

pub async fn complete_project(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let project = load_project(project_id, deps).await?;

    let (project, _) = StatusChange::new(WorkflowEvent::Completed, Trigger::AdminAction)
        .by(actor.user_id())
        .log(ActivityAction::ProjectCompleted, json!({}))
        .apply(&project, deps)
        .await?;

    info!(project_id = %project.id, "Project completed");

    Ok(notify(project, "project_completed", PROJECT_COMPLETED_MESSAGE, deps)
        .await?
        .into())
}

pub async fn cancel_project(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let project = load_project(project_id, deps).await?;

    let (project, _) = StatusChange::new(WorkflowEvent::Cancelled, Trigger::AdminAction)
        .by(actor.user_id())
        .log(ActivityAction::ProjectCancelled, json!({}))
        .apply(&project, deps)
        .await?;

    info!(project_id = %project.id, "Project cancelled");

    Ok(quiet(project))
}

// =============================================================================
// Editor work
// =============================================================================

pub async fn start_editing(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    let project = load_project(project_id, deps).await?;
    actor
        .can(Capability::WorkOnProject)
        .on_project(project.editor_id)
        .check()?;

    let (project, _) = StatusChange::new(WorkflowEvent::EditingStarted, trigger_for(actor))
        .by(actor.user_id())
        .log(ActivityAction::EditingStarted, json!({}))
        .apply(&project, deps)
        .await?;

    Ok(quiet(project))
}

/// Hand in the final cut. Admins are notified for review.
pub async fn submit_final(
    actor: &Actor,
    project_id: ProjectId,
    input: SubmitFinalInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    let project = load_project(project_id, deps).await?;
    actor
        .can(Capability::WorkOnProject)
        .on_project(project.editor_id)
        .check()?;

    let url = input
        .final_video_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::validation("Final video URL is required"))?;
    if !is_valid_url(&url) {
        return Err(AppError::validation("Final video URL must be a valid URL"));
    }

    let (project, _) = StatusChange::new(WorkflowEvent::FinalSubmitted, trigger_for(actor))
        .by(actor.user_id())
        .changes(ProjectChanges {
            final_video_url: Some(url.clone()),
            ..Default::default()
        })
        .log(ActivityAction::FinalSubmitted, json!({ "finalVideoUrl": url }))
        .apply(&project, deps)
        .await?;

    info!(project_id = %project.id, "Final video submitted");

    Ok(notify(project, "final_submitted", FINAL_SUBMITTED_MESSAGE, deps)
        .await?
        .into())
}
