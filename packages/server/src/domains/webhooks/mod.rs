//! Webhooks domain - outbound calls to the automation workflows and their callbacks
//!
//! Pipeline webhooks (research, scripting, optimizer, production) drive a project through
//! its automated stages and are tracked on the project. Notification webhooks only inform.

pub mod actions;
pub mod callbacks;
pub mod data;
pub mod dispatcher;
pub mod models;
pub mod orchestrator;
pub mod payload;
pub mod types;

pub use dispatcher::{call_webhook, WebhookOutcome};
pub use models::WebhookConfig;
pub use orchestrator::WorkflowResult;
pub use payload::WebhookPayload;
pub use types::{WebhookStatus, WebhookType};
