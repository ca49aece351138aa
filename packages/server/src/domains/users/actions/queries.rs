//! User query actions

use tracing::debug;

use crate::common::auth::{Actor, Capability};
use crate::common::{AppError, AppResult, UserId};
use crate::domains::users::data::{UserData, UserFilters};
use crate::domains::users::models::User;
use crate::kernel::ServerDeps;

/// List users with assigned project counts (admin only)
pub async fn list_users(
    actor: &Actor,
    filters: UserFilters,
    deps: &ServerDeps,
) -> AppResult<Vec<UserData>> {
    actor.can(Capability::ManageUsers).check()?;

    let users = User::list_with_project_counts(filters.role, &deps.db_pool).await?;

    debug!(count = users.len(), "Listed users");

    Ok(users.into_iter().map(UserData::from).collect())
}

/// Get one user. Admins may read anyone, everyone else only themselves.
pub async fn get_user(actor: &Actor, user_id: UserId, deps: &ServerDeps) -> AppResult<UserData> {
    if actor.user_id() != user_id {
        actor.can(Capability::ManageUsers).check()?;
    }

    let user = User::find_by_id_optional(user_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let count = User::count_assigned_projects(user_id, &deps.db_pool).await?;

    Ok(UserData::from(user).with_project_count(count))
}
