use axum::extract::Extension;

use crate::common::AppResult;
use crate::domains::auth::actions;
use crate::domains::auth::{
    ForgotPasswordInput, LoginInput, LoginResponse, MessageResponse, ResetPasswordInput,
};
use crate::domains::users::UserData;
use crate::server::app::AppState;
use crate::server::extract::Json;
use crate::server::middleware::AuthUser;

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    Ok(Json(actions::login(input, &state.deps).await?))
}

pub async fn me_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserData>> {
    Ok(Json(actions::me(&user.actor(), &state.deps).await?))
}

/// Always answers with the same message whether or not the account exists
pub async fn forgot_password_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    actions::forgot_password(input.email, &state.deps).await?;
    Ok(Json(MessageResponse::ok(actions::FORGOT_PASSWORD_MESSAGE)))
}

pub async fn reset_password_handler(
    Extension(state): Extension<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    actions::reset_password(input.token, input.password, &state.deps).await?;
    Ok(Json(MessageResponse::ok(actions::RESET_PASSWORD_MESSAGE)))
}
