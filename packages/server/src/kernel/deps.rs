//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain actions.
//! External services use trait abstractions to enable testing.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::WorkflowSettings;
use crate::domains::auth::JwtService;
use crate::kernel::BaseWebhookClient;

/// Server dependencies accessible to actions
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub webhook_client: Arc<dyn BaseWebhookClient>,
    /// JWT service for token creation
    pub jwt_service: Arc<JwtService>,
    pub workflow: WorkflowSettings,
    pub bcrypt_cost: u32,
    /// Base URL of the dashboard, used to build password reset links
    pub public_url: String,
    /// Log password reset links instead of only storing them
    pub dev_mode: bool,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        webhook_client: Arc<dyn BaseWebhookClient>,
        jwt_service: Arc<JwtService>,
        workflow: WorkflowSettings,
        bcrypt_cost: u32,
        public_url: String,
        dev_mode: bool,
    ) -> Self {
        Self {
            db_pool,
            webhook_client,
            jwt_service,
            workflow,
            bcrypt_cost,
            public_url,
            dev_mode,
        }
    }
}
