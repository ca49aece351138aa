pub mod webhook_config;

pub use webhook_config::*;
