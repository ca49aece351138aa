//! Client domain actions

mod mutations;
mod queries;

pub use mutations::*;
pub use queries::*;
