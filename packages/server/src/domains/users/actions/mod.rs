//! User domain actions - business logic functions
//!
//! Actions are async functions called from HTTP handlers.
//! They authorize, validate, do the work and return API data.

mod mutations;
mod queries;

pub use mutations::*;
pub use queries::*;
