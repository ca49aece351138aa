//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;
pub mod webhook_client;

pub use deps::ServerDeps;
pub use test_dependencies::{MockWebhookClient, TestDependencies, WebhookCall};
pub use traits::*;
pub use webhook_client::{HttpWebhookClient, WEBHOOK_SECRET_HEADER};
