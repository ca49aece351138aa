//! Projects domain - one video moving from idea to finished cut
//!
//! `status` holds the transition table, `machines` decides what an event does, and
//! `workflow` persists those decisions. Actions are the entry points for HTTP handlers.

pub mod actions;
pub mod data;
pub mod machines;
pub mod models;
pub mod status;
pub mod workflow;

pub use data::{ProjectData, WorkflowResponse};
pub use machines::{Decision, ProjectMachine, WorkflowEvent};
pub use models::{ActivityAction, ActivityLog, Project};
pub use status::{ProjectStatus, TransitionError};
