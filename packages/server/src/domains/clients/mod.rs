//! Clients domain - brands the agency produces videos for

pub mod actions;
pub mod data;
pub mod models;

pub use data::{ClientData, ClientRef, CreateClientInput, UpdateClientInput};
pub use models::{Client, ClientFields};
