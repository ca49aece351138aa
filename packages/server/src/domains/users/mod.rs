//! Users domain - agency admins and video editors

pub mod actions;
pub mod data;
pub mod models;

// Re-export commonly used types
pub use data::{CreateUserInput, UpdateUserInput, UserData, UserFilters, UserRef};
pub use models::{CreateUser, UpdateUser, User, UserRole};
