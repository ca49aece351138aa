//! Project query actions

use tracing::debug;

use super::load_project;
use crate::common::auth::{Actor, Capability};
use crate::common::{AppError, AppResult, ProjectId};
use crate::domains::projects::data::{DashboardStats, ProjectData, ProjectFilters};
use crate::domains::projects::models::{ActivityLog, Project, ProjectFilter};
use crate::domains::projects::status::{self, StatusInfo};
use crate::kernel::ServerDeps;

const RECENT_ACTIVITY_LIMIT: i64 = 20;

/// List projects, newest first. Editors only see projects assigned to them.
pub async fn list_projects(
    actor: &Actor,
    filters: ProjectFilters,
    deps: &ServerDeps,
) -> AppResult<Vec<ProjectData>> {
    let filter = ProjectFilter {
        status: filters.status,
        client_id: filters.client_id,
        editor_id: (!actor.is_admin()).then(|| actor.user_id()),
        search: filters.search,
    };

    let rows = Project::list(&filter, &deps.db_pool).await?;

    debug!(count = rows.len(), "Listed projects");

    Ok(rows.into_iter().map(ProjectData::summary).collect())
}

/// One project with its client, editor and the last 20 activity entries.
pub async fn get_project(
    actor: &Actor,
    project_id: ProjectId,
    deps: &ServerDeps,
) -> AppResult<ProjectData> {
    let project = load_project(project_id, deps).await?;
    actor
        .can(Capability::WorkOnProject)
        .on_project(project.editor_id)
        .check()?;

    let row = Project::find_with_relations(project_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Project"))?;
    let logs =
        ActivityLog::recent_for_project(project_id, RECENT_ACTIVITY_LIMIT, &deps.db_pool).await?;

    Ok(ProjectData::detail(row, logs))
}

/// Every status with its presentation and next legal statuses
pub fn status_catalog() -> Vec<StatusInfo> {
    status::status_catalog()
}

/// Dashboard counts. Editors get counts over their own projects.
pub async fn dashboard_stats(actor: &Actor, deps: &ServerDeps) -> AppResult<DashboardStats> {
    let editor_id = (!actor.is_admin()).then(|| actor.user_id());
    let counts = Project::counts(editor_id, &deps.db_pool).await?;
    Ok(counts.into())
}
