//! User mutation actions (admin only)

use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::utils::{has_min_chars, is_valid_email, normalize_email};
use crate::common::{AppError, AppResult, UserId};
use crate::domains::auth::password::{hash_password, password_long_enough, MIN_PASSWORD_LENGTH};
use crate::domains::users::data::{CreateUserInput, UpdateUserInput, UserData};
use crate::domains::users::models::{CreateUser, UpdateUser, User, UserRole};
use crate::kernel::ServerDeps;

fn validate_name(name: &str) -> AppResult<()> {
    if !has_min_chars(name, 2) {
        return Err(AppError::validation("Name must be at least 2 characters"));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if !password_long_enough(password) {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Non-empty trimmed value of an optional patch field
fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create a user (editor unless a role is given)
pub async fn create_user(
    actor: &Actor,
    input: CreateUserInput,
    deps: &ServerDeps,
) -> AppResult<UserData> {
    actor.can(Capability::ManageUsers).check()?;

    let name = input.name.trim().to_string();
    let email = normalize_email(&input.email);
    validate_name(&name)?;
    validate_email(&email)?;
    validate_password(&input.password)?;

    if User::email_taken(&email, None, &deps.db_pool).await? {
        return Err(AppError::validation("Email already exists"));
    }

    let password_hash = hash_password(&input.password, deps.bcrypt_cost).await?;
    let role = input.role.unwrap_or(UserRole::Editor);

    info!(email = %email, role = %role, "Creating user");

    let user = User::create(
        CreateUser {
            name,
            email,
            password_hash,
            role,
        },
        &deps.db_pool,
    )
    .await?;

    Ok(UserData::from(user).with_project_count(0))
}

/// Partially update a user
pub async fn update_user(
    actor: &Actor,
    user_id: UserId,
    input: UpdateUserInput,
    deps: &ServerDeps,
) -> AppResult<UserData> {
    actor.can(Capability::ManageUsers).check()?;

    let existing = User::find_by_id_optional(user_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let name = provided(input.name);
    if let Some(name) = &name {
        validate_name(name)?;
    }

    let email = provided(input.email).map(|e| normalize_email(&e));
    if let Some(email) = &email {
        validate_email(email)?;
        if *email != existing.email && User::email_taken(email, Some(user_id), &deps.db_pool).await? {
            return Err(AppError::validation("Email already exists"));
        }
    }

    let password_hash = match input.password.filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password, deps.bcrypt_cost).await?)
        }
        None => None,
    };

    info!(user_id = %user_id, "Updating user");

    let user = User::update(
        user_id,
        UpdateUser {
            name,
            email,
            password_hash,
            role: input.role,
        },
        &deps.db_pool,
    )
    .await?;

    Ok(user.into())
}

/// Delete a user that has no assigned projects
pub async fn delete_user(actor: &Actor, user_id: UserId, deps: &ServerDeps) -> AppResult<()> {
    actor.can(Capability::ManageUsers).check()?;

    if actor.user_id() == user_id {
        return Err(AppError::validation("Cannot delete your own account"));
    }

    User::find_by_id_optional(user_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let assigned = User::count_assigned_projects(user_id, &deps.db_pool).await?;
    if assigned > 0 {
        return Err(AppError::validation(format!(
            "Cannot delete user with {} assigned projects",
            assigned
        )));
    }

    info!(user_id = %user_id, "Deleting user");

    User::delete(user_id, &deps.db_pool).await?;

    Ok(())
}
