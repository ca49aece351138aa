//! Client mutation actions (admin only)

use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::utils::{has_min_chars, optional_url};
use crate::common::{AppError, AppResult, ClientId};
use crate::domains::clients::data::{ClientData, CreateClientInput, UpdateClientInput};
use crate::domains::clients::models::{Client, ClientFields};
use crate::kernel::ServerDeps;

/// Trimmed value, `None` when blank
fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn guideline_url(value: Option<&str>, field: &str) -> AppResult<Option<String>> {
    optional_url(value).map_err(|_| AppError::validation(format!("{} must be a valid URL", field)))
}

fn validate_fields(fields: &ClientFields) -> AppResult<()> {
    if !has_min_chars(&fields.name, 2) {
        return Err(AppError::validation("Name must be at least 2 characters"));
    }
    if !has_min_chars(&fields.content_niche, 2) {
        return Err(AppError::validation("Content niche is required"));
    }
    Ok(())
}

pub async fn create_client(
    actor: &Actor,
    input: CreateClientInput,
    deps: &ServerDeps,
) -> AppResult<ClientData> {
    actor.can(Capability::ManageClients).check()?;

    let fields = ClientFields {
        name: input.name.trim().to_string(),
        content_niche: input.content_niche.trim().to_string(),
        avatar_id: optional_text(input.avatar_id.as_deref()),
        voice_id: optional_text(input.voice_id.as_deref()),
        brand_guidelines_url: guideline_url(
            input.brand_guidelines_url.as_deref(),
            "Brand guidelines URL",
        )?,
        editing_guidelines_url: guideline_url(
            input.editing_guidelines_url.as_deref(),
            "Editing guidelines URL",
        )?,
        is_active: true,
    };
    validate_fields(&fields)?;

    info!(name = %fields.name, "Creating client");

    let client = Client::create(fields, &deps.db_pool).await?;

    info!(client_id = %client.id, "Client created");

    Ok(ClientData {
        project_count: Some(0),
        ..client.into()
    })
}

/// Apply a partial update. Fields not present in the input keep their value.
pub async fn update_client(
    actor: &Actor,
    client_id: ClientId,
    input: UpdateClientInput,
    deps: &ServerDeps,
) -> AppResult<ClientData> {
    actor.can(Capability::ManageClients).check()?;

    let existing = Client::find_by_id_optional(client_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let mut fields = ClientFields::from(&existing);
    if let Some(name) = input.name {
        fields.name = name.trim().to_string();
    }
    if let Some(niche) = input.content_niche {
        fields.content_niche = niche.trim().to_string();
    }
    if let Some(avatar_id) = input.avatar_id {
        fields.avatar_id = optional_text(Some(&avatar_id));
    }
    if let Some(voice_id) = input.voice_id {
        fields.voice_id = optional_text(Some(&voice_id));
    }
    if let Some(url) = input.brand_guidelines_url {
        fields.brand_guidelines_url = guideline_url(Some(&url), "Brand guidelines URL")?;
    }
    if let Some(url) = input.editing_guidelines_url {
        fields.editing_guidelines_url = guideline_url(Some(&url), "Editing guidelines URL")?;
    }
    if let Some(is_active) = input.is_active {
        fields.is_active = is_active;
    }
    validate_fields(&fields)?;

    info!(client_id = %client_id, "Updating client");

    let client = Client::update(client_id, fields, &deps.db_pool).await?;

    Ok(client.into())
}

/// Delete a client that has no projects
pub async fn delete_client(actor: &Actor, client_id: ClientId, deps: &ServerDeps) -> AppResult<()> {
    actor.can(Capability::ManageClients).check()?;

    Client::find_by_id_optional(client_id, &deps.db_pool)
        .await?
        .ok_or(AppError::NotFound("Client"))?;

    let projects = Client::count_projects(client_id, &deps.db_pool).await?;
    if projects > 0 {
        return Err(AppError::validation(format!(
            "Cannot delete client with {} projects",
            projects
        )));
    }

    info!(client_id = %client_id, "Deleting client");

    Client::delete(client_id, &deps.db_pool).await?;

    Ok(())
}
