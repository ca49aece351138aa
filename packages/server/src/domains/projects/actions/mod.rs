//! Project domain actions - business logic functions
//!
//! Actions are async functions called from HTTP handlers.
//! CRUD lives in `mutations`/`queries`; the review and editing steps that move a project
//! through its pipeline live in `workflow`.

mod mutations;
mod queries;
mod workflow;

pub use mutations::*;
pub use queries::*;
pub use workflow::*;

use crate::common::{AppError, AppResult, ProjectId};
use crate::domains::projects::models::Project;
use crate::kernel::ServerDeps;

pub(crate) async fn load_project(id: ProjectId, deps: &ServerDeps) -> AppResult<Project> {
    Project::find_by_id_optional(id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Project"))
}
