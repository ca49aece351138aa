// Business domains
pub mod auth;
pub mod clients;
pub mod projects;
pub mod users;
pub mod webhooks;
