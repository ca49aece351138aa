use axum::extract::{Extension, Path};

use super::{path_id, SuccessResponse};
use crate::common::{AppResult, ProjectId};
use crate::domains::projects::actions;
use crate::domains::projects::data::{
    CreateProjectInput, EditorInput, FeedbackInput, ProjectData, ProjectFilters,
    SubmitFinalInput, UpdateProjectInput, WorkflowResponse,
};
use crate::domains::projects::status::StatusInfo;
use crate::server::app::AppState;
use crate::server::extract::{Json, Query};
use crate::server::middleware::AuthUser;

fn project_id(raw: &str) -> AppResult<ProjectId> {
    path_id(raw, "Project")
}

// =============================================================================
// CRUD
// =============================================================================

pub async fn list_projects_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(filters): Query<ProjectFilters>,
) -> AppResult<Json<Vec<ProjectData>>> {
    Ok(Json(
        actions::list_projects(&user.actor(), filters, &state.deps).await?,
    ))
}

pub async fn create_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<CreateProjectInput>,
) -> AppResult<Json<WorkflowResponse>> {
    Ok(Json(
        actions::create_project(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn get_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ProjectData>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::get_project(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn update_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateProjectInput>,
) -> AppResult<Json<ProjectData>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::update_project(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn delete_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let id = project_id(&id)?;
    actions::delete_project(&user.actor(), id, &state.deps).await?;
    Ok(Json(SuccessResponse::ok()))
}

pub async fn status_catalog_handler(_user: AuthUser) -> Json<Vec<StatusInfo>> {
    Json(actions::status_catalog())
}

// =============================================================================
// Workflow actions
// =============================================================================

pub async fn approve_script_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::approve_script(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn reject_script_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<FeedbackInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::reject_script(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn approve_video_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<EditorInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::approve_video(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn reject_video_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<FeedbackInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::reject_video(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn assign_editor_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<EditorInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::assign_editor(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn start_editing_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::start_editing(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn submit_final_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<SubmitFinalInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::submit_final(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn request_changes_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<FeedbackInput>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::request_changes(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn complete_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::complete_project(&user.actor(), id, &state.deps).await?,
    ))
}

pub async fn cancel_project_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<WorkflowResponse>> {
    let id = project_id(&id)?;
    Ok(Json(
        actions::cancel_project(&user.actor(), id, &state.deps).await?,
    ))
}
