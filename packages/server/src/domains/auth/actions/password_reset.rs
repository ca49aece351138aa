//! Forgot / reset password flow
//!
//! Only the SHA-256 of a reset token is stored. Tokens expire after an hour and are
//! consumed by a successful reset.

use chrono::{Duration, Utc};
use tracing::info;

use crate::common::utils::{generate_token, hash_token, normalize_email};
use crate::common::{AppError, AppResult};
use crate::domains::auth::password::{hash_password, password_long_enough, MIN_PASSWORD_LENGTH};
use crate::domains::users::User;
use crate::kernel::ServerDeps;

pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with that email, a password reset link has been sent.";
pub const RESET_PASSWORD_MESSAGE: &str =
    "Password has been reset successfully. You can now log in.";

fn invalid_token() -> AppError {
    AppError::validation("Invalid or expired reset token")
}

/// Issue a reset token if the email belongs to a user.
///
/// Returns the raw token when one was issued so callers with a delivery channel can use it;
/// HTTP callers always answer with [`FORGOT_PASSWORD_MESSAGE`].
pub async fn forgot_password(email: Option<String>, deps: &ServerDeps) -> AppResult<Option<String>> {
    let email = email
        .map(|e| normalize_email(&e))
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::validation("Email is required"))?;

    let Some(user) = User::find_by_email(&email, &deps.db_pool).await? else {
        return Ok(None);
    };

    let token = generate_token();
    let expires = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    User::set_reset_token(user.id, &hash_token(&token), expires, &deps.db_pool).await?;

    if deps.dev_mode {
        let reset_url = format!(
            "{}/reset-password?token={}",
            deps.public_url.trim_end_matches('/'),
            token
        );
        info!(
            user_id = %user.id,
            email = %user.email,
            reset_url = %reset_url,
            expires = %expires.to_rfc3339(),
            "Password reset token issued (dev mode)"
        );
    } else {
        info!(user_id = %user.id, "Password reset token issued");
    }

    Ok(Some(token))
}

/// Set a new password using a reset token
pub async fn reset_password(
    token: Option<String>,
    password: Option<String>,
    deps: &ServerDeps,
) -> AppResult<()> {
    let (Some(token), Some(password)) = (
        token.filter(|t| !t.is_empty()),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::validation("Token and password are required"));
    };

    if !password_long_enough(&password) {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let token_hash = hash_token(&token);

    // Cheap rejection before paying for bcrypt
    User::find_by_reset_token_hash(&token_hash, &deps.db_pool)
        .await?
        .ok_or_else(invalid_token)?;

    let password_hash = hash_password(&password, deps.bcrypt_cost).await?;
    let user_id = User::redeem_reset_token(&token_hash, &password_hash, &deps.db_pool)
        .await?
        .ok_or_else(invalid_token)?;

    info!(user_id = %user_id, "Password reset successful");

    Ok(())
}
