//! Typed ID aliases for every persisted entity.

pub use super::id::Id;

/// Marker type for agency users (admins and editors).
pub struct User;

/// Marker type for agency clients.
pub struct Client;

/// Marker type for video projects.
pub struct Project;

/// Marker type for project activity log entries.
pub struct ActivityLog;

/// Marker type for stored webhook configuration rows.
pub struct WebhookConfig;

pub type UserId = Id<User>;
pub type ClientId = Id<Client>;
pub type ProjectId = Id<Project>;
pub type ActivityLogId = Id<ActivityLog>;
pub type WebhookConfigId = Id<WebhookConfig>;
