use axum::extract::{Extension, Path};

use super::{path_id, SuccessResponse};
use crate::common::AppResult;
use crate::domains::users::actions;
use crate::domains::users::{CreateUserInput, UpdateUserInput, UserData, UserFilters};
use crate::server::app::AppState;
use crate::server::extract::{Json, Query};
use crate::server::middleware::AuthUser;

pub async fn list_users_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Query(filters): Query<UserFilters>,
) -> AppResult<Json<Vec<UserData>>> {
    Ok(Json(
        actions::list_users(&user.actor(), filters, &state.deps).await?,
    ))
}

pub async fn create_user_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<UserData>> {
    Ok(Json(
        actions::create_user(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn get_user_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<UserData>> {
    let id = path_id(&id, "User")?;
    Ok(Json(actions::get_user(&user.actor(), id, &state.deps).await?))
}

pub async fn update_user_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserData>> {
    let id = path_id(&id, "User")?;
    Ok(Json(
        actions::update_user(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn delete_user_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let id = path_id(&id, "User")?;
    actions::delete_user(&user.actor(), id, &state.deps).await?;
    Ok(Json(SuccessResponse::ok()))
}
