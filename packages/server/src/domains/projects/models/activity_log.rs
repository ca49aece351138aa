use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};

use crate::common::{ActivityLogId, ProjectId, UserId};

/// Audit trail entry kinds (stored as TEXT)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    ProjectCreated,
    StatusChanged,
    ScriptApproved,
    ScriptRejected,
    VideoApproved,
    VideoRejected,
    EditorAssigned,
    EditingStarted,
    FinalSubmitted,
    ChangesRequested,
    ProjectCompleted,
    ProjectCancelled,
    WebhookCalled,
    WebhookSuccess,
    WebhookFailed,
    WebhookRetry,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::ProjectCreated => "PROJECT_CREATED",
            ActivityAction::StatusChanged => "STATUS_CHANGED",
            ActivityAction::ScriptApproved => "SCRIPT_APPROVED",
            ActivityAction::ScriptRejected => "SCRIPT_REJECTED",
            ActivityAction::VideoApproved => "VIDEO_APPROVED",
            ActivityAction::VideoRejected => "VIDEO_REJECTED",
            ActivityAction::EditorAssigned => "EDITOR_ASSIGNED",
            ActivityAction::EditingStarted => "EDITING_STARTED",
            ActivityAction::FinalSubmitted => "FINAL_SUBMITTED",
            ActivityAction::ChangesRequested => "CHANGES_REQUESTED",
            ActivityAction::ProjectCompleted => "PROJECT_COMPLETED",
            ActivityAction::ProjectCancelled => "PROJECT_CANCELLED",
            ActivityAction::WebhookCalled => "WEBHOOK_CALLED",
            ActivityAction::WebhookSuccess => "WEBHOOK_SUCCESS",
            ActivityAction::WebhookFailed => "WEBHOOK_FAILED",
            ActivityAction::WebhookRetry => "WEBHOOK_RETRY",
        }
    }
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| anyhow::anyhow!("Invalid activity action: {}", s))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: ActivityLogId,
    pub project_id: Option<ProjectId>,
    pub user_id: Option<UserId>,
    pub action: String,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Activity entry joined with the acting user's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActivityLogWithUser {
    #[sqlx(flatten)]
    pub log: ActivityLog,
    pub user_name: Option<String>,
}

impl ActivityLog {
    /// Entries written in one transaction keep their order through `clock_timestamp()`.
    pub async fn record<'e>(
        project_id: ProjectId,
        user_id: Option<UserId>,
        action: ActivityAction,
        details: serde_json::Value,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let log = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO activity_logs (id, project_id, user_id, action, details, created_at)
            VALUES ($1, $2, $3, $4, $5, clock_timestamp())
            RETURNING *
            "#,
        )
        .bind(ActivityLogId::new())
        .bind(project_id)
        .bind(user_id)
        .bind(action.as_str())
        .bind(details)
        .fetch_one(executor)
        .await?;
        Ok(log)
    }

    /// Most recent entries first
    pub async fn recent_for_project(
        project_id: ProjectId,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<ActivityLogWithUser>> {
        let logs = sqlx::query_as::<_, ActivityLogWithUser>(
            r#"
            SELECT a.*, u.name AS user_name
            FROM activity_logs a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE a.project_id = $1
            ORDER BY a.created_at DESC, a.id DESC
            LIMIT $2
            "#,
        )
        .bind(project_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(logs)
    }

    pub async fn find_for_project(project_id: ProjectId, pool: &PgPool) -> Result<Vec<Self>> {
        let logs = sqlx::query_as::<_, Self>(
            "SELECT * FROM activity_logs WHERE project_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;
        Ok(logs)
    }

    pub fn action(&self) -> Option<ActivityAction> {
        self.action.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_match_serde() {
        let actions = [
            ActivityAction::ProjectCreated,
            ActivityAction::StatusChanged,
            ActivityAction::EditorAssigned,
            ActivityAction::WebhookRetry,
        ];
        for action in actions {
            assert_eq!(
                serde_json::to_value(action).unwrap(),
                serde_json::json!(action.as_str())
            );
            assert_eq!(action.as_str().parse::<ActivityAction>().unwrap(), action);
        }
        assert!("SOMETHING_ELSE".parse::<ActivityAction>().is_err());
    }
}
