//! Email and password login

use tracing::{info, warn};

use crate::common::auth::Actor;
use crate::common::utils::normalize_email;
use crate::common::{AppError, AppResult};
use crate::domains::auth::data::{LoginInput, LoginResponse};
use crate::domains::auth::password::verify_password;
use crate::domains::users::{User, UserData};
use crate::kernel::ServerDeps;

/// Verify credentials and issue a 24h JWT.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(input: LoginInput, deps: &ServerDeps) -> AppResult<LoginResponse> {
    let email = normalize_email(&input.email);
    if email.is_empty() || input.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let Some(user) = User::find_by_email(&email, &deps.db_pool).await? else {
        warn!(email = %email, "Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&input.password, &user.password_hash).await? {
        warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = deps
        .jwt_service
        .create_token(user.id, user.email.clone(), user.role)?;

    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(LoginResponse {
        token,
        user: user.into(),
    })
}

/// Current user profile
pub async fn me(actor: &Actor, deps: &ServerDeps) -> AppResult<UserData> {
    let user = User::find_by_id_optional(actor.user_id(), &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(user.into())
}
