use axum::extract::{Extension, Path};

use super::{path_id, SuccessResponse};
use crate::common::AppResult;
use crate::domains::clients::actions;
use crate::domains::clients::{ClientData, CreateClientInput, UpdateClientInput};
use crate::server::app::AppState;
use crate::server::extract::Json;
use crate::server::middleware::AuthUser;

pub async fn list_clients_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<ClientData>>> {
    Ok(Json(actions::list_clients(&user.actor(), &state.deps).await?))
}

pub async fn create_client_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<CreateClientInput>,
) -> AppResult<Json<ClientData>> {
    Ok(Json(
        actions::create_client(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn get_client_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ClientData>> {
    let id = path_id(&id, "Client")?;
    Ok(Json(actions::get_client(&user.actor(), id, &state.deps).await?))
}

pub async fn update_client_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateClientInput>,
) -> AppResult<Json<ClientData>> {
    let id = path_id(&id, "Client")?;
    Ok(Json(
        actions::update_client(&user.actor(), id, input, &state.deps).await?,
    ))
}

pub async fn delete_client_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    let id = path_id(&id, "Client")?;
    actions::delete_client(&user.actor(), id, &state.deps).await?;
    Ok(Json(SuccessResponse::ok()))
}
