//! Client query actions (any authenticated user)

use crate::common::auth::Actor;
use crate::common::{AppError, AppResult, ClientId};
use crate::domains::clients::data::ClientData;
use crate::domains::clients::models::Client;
use crate::kernel::ServerDeps;

pub async fn list_clients(_actor: &Actor, deps: &ServerDeps) -> AppResult<Vec<ClientData>> {
    let clients = Client::list_with_project_counts(&deps.db_pool).await?;
    Ok(clients.into_iter().map(ClientData::from).collect())
}

pub async fn get_client(
    _actor: &Actor,
    client_id: ClientId,
    deps: &ServerDeps,
) -> AppResult<ClientData> {
    let client = Client::find_with_project_count(client_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Client"))?;
    Ok(client.into())
}
