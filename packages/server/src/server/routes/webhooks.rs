use axum::{body::Bytes, extract::Extension, http::HeaderMap};

use crate::common::AppResult;
use crate::domains::webhooks::actions;
use crate::domains::webhooks::callbacks::CallbackAck;
use crate::domains::webhooks::data::{
    RetryResponse, RetryWebhookInput, TestWebhookInput, TriggerResponse, TriggerWebhookInput,
    UpsertWebhookConfigInput,
};
use crate::domains::webhooks::dispatcher::TestOutcome;
use crate::domains::webhooks::WebhookConfig;
use crate::kernel::WEBHOOK_SECRET_HEADER;
use crate::server::app::AppState;
use crate::server::extract::Json;
use crate::server::middleware::AuthUser;

pub async fn list_webhook_configs_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<WebhookConfig>>> {
    Ok(Json(
        actions::list_webhook_configs(&user.actor(), &state.deps).await?,
    ))
}

pub async fn upsert_webhook_config_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<UpsertWebhookConfigInput>,
) -> AppResult<Json<WebhookConfig>> {
    Ok(Json(
        actions::upsert_webhook_config(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn test_webhook_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<TestWebhookInput>,
) -> AppResult<Json<TestOutcome>> {
    Ok(Json(
        actions::test_webhook(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn trigger_webhook_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<TriggerWebhookInput>,
) -> AppResult<Json<TriggerResponse>> {
    Ok(Json(
        actions::trigger_webhook(&user.actor(), input, &state.deps).await?,
    ))
}

pub async fn retry_webhook_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
    Json(input): Json<RetryWebhookInput>,
) -> AppResult<Json<RetryResponse>> {
    Ok(Json(
        actions::retry_webhook(&user.actor(), input, &state.deps).await?,
    ))
}

/// Callbacks authenticate with the shared webhook secret, not a user token.
/// The raw body is only parsed once the secret checks out.
pub async fn webhook_callback_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<CallbackAck>> {
    let secret = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    Ok(Json(
        actions::receive_callback(secret, &body, &state.deps).await?,
    ))
}
