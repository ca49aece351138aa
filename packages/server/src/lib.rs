// Avatar Agency - API Core
//
// Backend for the video production pipeline: projects move from idea to finished cut
// through automation webhooks (research, scripting, production) and human review.
//
// Business logic lives per-domain in domains/*; HTTP wiring in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
