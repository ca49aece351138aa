//! Webhook configuration actions (admin only)

use tracing::info;

use crate::common::auth::{Actor, Capability};
use crate::common::{AppError, AppResult};
use crate::domains::webhooks::data::UpsertWebhookConfigInput;
use crate::domains::webhooks::models::WebhookConfig;
use crate::domains::webhooks::WebhookType;
use crate::kernel::ServerDeps;

pub async fn list_webhook_configs(
    actor: &Actor,
    deps: &ServerDeps,
) -> AppResult<Vec<WebhookConfig>> {
    actor.can(Capability::ManageWebhooks).check()?;

    Ok(WebhookConfig::find_all(&deps.db_pool).await?)
}

/// Create or replace the stored config for one webhook type.
/// A missing URL is stored empty, which falls back to the environment URL.
pub async fn upsert_webhook_config(
    actor: &Actor,
    input: UpsertWebhookConfigInput,
    deps: &ServerDeps,
) -> AppResult<WebhookConfig> {
    actor.can(Capability::ManageWebhooks).check()?;

    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::validation("Name is required"))?;
    let name: WebhookType = name
        .parse()
        .map_err(|_| AppError::validation("Invalid webhook name"))?;

    let url = input.url.as_deref().map(str::trim).unwrap_or_default();
    let secret = input.secret.as_deref().filter(|s| !s.is_empty());
    let is_active = input.is_active.unwrap_or(true);

    info!(webhook_type = %name, is_active, "Saving webhook config");

    Ok(WebhookConfig::upsert(name, url, secret, is_active, &deps.db_pool).await?)
}
