//! Webhook domain actions
//!
//! Actions are async functions called from HTTP handlers.
//! Admin actions configure and drive outbound webhooks; `receive_callback` is the
//! entry point for the automation workflows.

mod callback;
mod config;
mod control;

pub use callback::*;
pub use config::*;
pub use control::*;
