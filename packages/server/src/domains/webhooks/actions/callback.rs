//! Inbound callback action

use serde_json::Value;

use crate::common::{AppError, AppResult};
use crate::domains::webhooks::callbacks::{handle_callback, parse_callback, verify_secret, CallbackAck};
use crate::kernel::ServerDeps;

/// Authenticate, validate and apply a callback from an automation workflow.
pub async fn receive_callback(
    secret_header: Option<&str>,
    body: &[u8],
    deps: &ServerDeps,
) -> AppResult<CallbackAck> {
    verify_secret(secret_header, deps.workflow.webhook_secret.as_deref())?;

    let body: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?;
    let callback = parse_callback(&body)?;
    handle_callback(callback, deps).await?;

    Ok(CallbackAck { success: true })
}
