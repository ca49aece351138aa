// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};

use super::{BaseWebhookClient, ServerDeps, WebhookHttpResponse};
use crate::config::WorkflowSettings;
use crate::domains::auth::JwtService;

pub const TEST_JWT_SECRET: &str = "test_jwt_secret";
pub const TEST_JWT_ISSUER: &str = "avatar-agency-test";

// =============================================================================
// Mock Webhook Client
// =============================================================================

/// A webhook call captured by the mock
#[derive(Debug, Clone)]
pub struct WebhookCall {
    pub url: String,
    pub secret: Option<String>,
    pub payload: serde_json::Value,
}

impl WebhookCall {
    /// The `type` field of the payload
    pub fn webhook_type(&self) -> Option<&str> {
        self.payload.get("type").and_then(|t| t.as_str())
    }
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Response(WebhookHttpResponse),
    TransportError(String),
}

pub struct MockWebhookClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    calls: Arc<Mutex<Vec<WebhookCall>>>,
}

impl MockWebhookClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for the next call. Unqueued calls get `200 {}`.
    pub fn with_response(self, status: u16, body: &str) -> Self {
        self.push_response(status, body);
        self
    }

    /// Queue a transport failure for the next call
    pub fn with_transport_error(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::TransportError(message.to_string()));
        self
    }

    /// Queue a response on a shared mock
    pub fn push_response(&self, status: u16, body: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Response(WebhookHttpResponse {
                status,
                body: body.to_string(),
            }));
    }

    /// Get all calls made so far
    pub fn calls(&self) -> Vec<WebhookCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Payload `type` of every call, in order
    pub fn called_types(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.webhook_type().map(str::to_string))
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for MockWebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseWebhookClient for MockWebhookClient {
    async fn post_json(
        &self,
        url: &str,
        secret: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<WebhookHttpResponse> {
        self.calls.lock().unwrap().push(WebhookCall {
            url: url.to_string(),
            secret: secret.map(str::to_string),
            payload: payload.clone(),
        });

        let outcome = {
            let mut outcomes = self.outcomes.lock().unwrap();
            if outcomes.is_empty() {
                None
            } else {
                Some(outcomes.remove(0))
            }
        };

        match outcome {
            Some(MockOutcome::Response(response)) => Ok(response),
            Some(MockOutcome::TransportError(message)) => Err(anyhow!(message)),
            None => Ok(WebhookHttpResponse {
                status: 200,
                body: "{}".to_string(),
            }),
        }
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub webhook_client: Arc<MockWebhookClient>,
    pub workflow: WorkflowSettings,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            webhook_client: Arc::new(MockWebhookClient::new()),
            workflow: WorkflowSettings::default(),
        }
    }

    /// Set a mock webhook client
    pub fn mock_webhooks(mut self, client: MockWebhookClient) -> Self {
        self.webhook_client = Arc::new(client);
        self
    }

    /// Override workflow settings (fallback URLs, secret, auto flags)
    pub fn workflow(mut self, workflow: WorkflowSettings) -> Self {
        self.workflow = workflow;
        self
    }

    /// Convert into ServerDeps for testing. Uses the cheapest bcrypt cost.
    pub fn into_server_deps(self, db_pool: PgPool) -> ServerDeps {
        ServerDeps::new(
            db_pool,
            self.webhook_client,
            Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            self.workflow,
            4,
            "http://localhost:3000".to_string(),
            true,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
