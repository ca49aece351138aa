use thiserror::Error;

use crate::domains::projects::status::TransitionError;

/// Errors surfaced by domain actions.
///
/// The HTTP layer maps each variant to a status code (see `server::error`).
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid webhook secret")]
    InvalidWebhookSecret,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
