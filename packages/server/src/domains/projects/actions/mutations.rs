//! Project mutation actions

use serde_json::json;
use tracing::info;

use super::load_project;
use crate::common::auth::{Actor, Capability};
use crate::common::utils::{has_min_chars, is_valid_url};
use crate::common::{AppError, AppResult, ProjectId, UserId};
use crate::domains::clients::Client;
use crate::domains::projects::data::{
    parse_deadline, CreateProjectInput, ProjectData, UpdateProjectInput, WorkflowResponse,
};
use crate::domains::projects::models::{
    ActivityAction, ActivityLog, CreateProject, Project, ProjectPatch,
};
use crate::domains::projects::workflow::apply_patch;
use crate::domains::users::{User, UserRole};
use crate::domains::webhooks::orchestrator::on_project_created;
use crate::kernel::ServerDeps;

const MIN_VIDEO_IDEA_CHARS: usize = 10;

fn video_idea(value: &str) -> AppResult<String> {
    let value = value.trim();
    if !has_min_chars(value, MIN_VIDEO_IDEA_CHARS) {
        return Err(AppError::validation(
            "Video idea must be at least 10 characters",
        ));
    }
    Ok(value.to_string())
}

fn deadline(value: &str) -> AppResult<chrono::DateTime<chrono::Utc>> {
    parse_deadline(value).ok_or_else(|| AppError::validation("Invalid date"))
}

async fn find_editor(editor_id: UserId, deps: &ServerDeps) -> AppResult<Option<User>> {
    Ok(User::find_by_id_optional(editor_id, &deps.db_pool)
        .await?
        .filter(|user| user.role == UserRole::Editor))
}

/// Create a project for a client. Research starts right away when auto-start is on.
pub async fn create_project(
    actor: &Actor,
    input: CreateProjectInput,
    deps: &ServerDeps,
) -> AppResult<WorkflowResponse> {
    actor.can(Capability::ReviewProjects).check()?;
    let pool = &deps.db_pool;

    let video_idea = video_idea(&input.video_idea)?;
    let deadline = deadline(&input.deadline)?;

    Client::find_by_id_optional(input.client_id, pool)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    if let Some(editor_id) = input.editor_id {
        find_editor(editor_id, deps)
            .await?
            .ok_or(AppError::NotFound("Editor"))?;
    }

    let mut tx = pool.begin().await?;
    let project = Project::create(
        CreateProject {
            client_id: input.client_id,
            editor_id: input.editor_id,
            video_idea: video_idea.clone(),
            deadline,
        },
        &mut *tx,
    )
    .await?;

    ActivityLog::record(
        project.id,
        Some(actor.user_id()),
        ActivityAction::ProjectCreated,
        json!({ "videoIdea": video_idea }),
        &mut *tx,
    )
    .await?;
    tx.commit().await?;

    info!(project_id = %project.id, client_id = %project.client_id, "Project created");

    if !deps.workflow.auto_start {
        return Ok(WorkflowResponse {
            project: project.into(),
            webhook: None,
        });
    }

    let started = on_project_created(&project, deps).await?;
    Ok(WorkflowResponse {
        project: started.project.into(),
        webhook: started.webhook,
    })
}

/// Patch a project.
///
/// Admins may change the idea, deadline, editor, status and script feedback. The final
/// video URL may also be set by the assigned editor. A status patch must be a legal edge.
pub async fn update_project(
    actor: &Actor,
    project_id: ProjectId,
    input: UpdateProjectInput,
    deps: &ServerDeps,
) -> AppResult<ProjectData> {
    let project = load_project(project_id, deps).await?;

    if input.touches_admin_fields() {
        actor.can(Capability::ReviewProjects).check()?;
    } else {
        actor
            .can(Capability::WorkOnProject)
            .on_project(project.editor_id)
            .check()?;
    }

    let mut patch = ProjectPatch::default();

    if let Some(value) = input.video_idea.as_deref() {
        patch.video_idea = Some(video_idea(value)?);
    }
    if let Some(value) = input.deadline.as_deref() {
        patch.deadline = Some(deadline(value)?);
    }
    if let Some(value) = input.editor_id.as_deref().map(str::trim) {
        patch.editor_id = Some(if value.is_empty() {
            None
        } else {
            let editor_id: UserId = value
                .parse()
                .map_err(|_| AppError::validation("Invalid editor"))?;
            let editor = find_editor(editor_id, deps)
                .await?
                .ok_or_else(|| AppError::validation("Invalid editor"))?;
            Some(editor.id)
        });
    }
    if let Some(value) = input.script_feedback.as_deref() {
        patch.script_feedback = Some(
            Some(value.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        );
    }
    if let Some(value) = input.final_video_url.as_deref().map(str::trim) {
        patch.final_video_url = Some(if value.is_empty() {
            None
        } else if is_valid_url(value) {
            Some(value.to_string())
        } else {
            return Err(AppError::validation("Final video URL must be a valid URL"));
        });
    }

    let updated = apply_patch(&project, patch, input.status, actor.user_id(), deps).await?;

    info!(project_id = %project.id, "Project updated");

    Ok(updated.into())
}

/// Delete a project. Its activity log goes with it.
pub async fn delete_project(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<()> {
    actor.can(Capability::ReviewProjects).check()?;
    let project = load_project(project_id, deps).await?;

    Project::delete(project.id, &deps.db_pool).await?;

    info!(project_id = %project.id, "Project deleted");
    Ok(())
}
