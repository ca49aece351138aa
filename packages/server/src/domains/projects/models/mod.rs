pub mod activity_log;
pub mod project;

pub use activity_log::*;
pub use project::*;
