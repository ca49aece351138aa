use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::UserId;
use crate::domains::users::models::{User, UserRole, UserWithProjectCount};

/// User as returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_count: Option<i64>,
}

impl UserData {
    pub fn with_project_count(mut self, count: i64) -> Self {
        self.project_count = Some(count);
        self
    }
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            project_count: None,
        }
    }
}

impl From<UserWithProjectCount> for UserData {
    fn from(user: UserWithProjectCount) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            project_count: Some(user.project_count),
        }
    }
}

/// Compact reference embedded in project responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to EDITOR
    pub role: Option<UserRole>,
}

/// Partial update. Empty strings are treated as "not provided".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub role: Option<UserRole>,
}
