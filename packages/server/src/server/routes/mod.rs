// HTTP routes
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod users;
pub mod webhooks;

pub use health::*;

use serde::Serialize;

use crate::common::{AppError, AppResult, Id};

/// Parse an id from the path. An id that does not parse cannot name a row.
pub(crate) fn path_id<T>(raw: &str, entity: &'static str) -> AppResult<Id<T>> {
    Id::parse(raw.trim()).map_err(|_| AppError::NotFound(entity))
}

/// Body for successful deletes
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
