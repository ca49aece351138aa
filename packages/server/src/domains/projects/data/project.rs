use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{ActivityLogId, ClientId, ProjectId, UserId};
use crate::domains::clients::ClientRef;
use crate::domains::projects::models::{ActivityLogWithUser, Project, ProjectCounts, ProjectWithRelations};
use crate::domains::projects::status::{ProjectStatus, StatusColor};
use crate::domains::users::UserRef;
use crate::domains::webhooks::{WebhookOutcome, WebhookStatus, WebhookType};

/// Project as returned by the API, with its status presentation resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectData {
    pub id: ProjectId,
    pub client_id: ClientId,
    pub editor_id: Option<UserId>,
    pub video_idea: String,
    pub deadline: DateTime<Utc>,
    pub status: ProjectStatus,
    pub status_label: &'static str,
    pub status_color: StatusColor,
    pub progress: u8,
    pub research_output: Option<String>,
    pub script: Option<String>,
    pub script_feedback: Option<String>,
    pub raw_video_url: Option<String>,
    pub final_video_url: Option<String>,
    pub webhook_status: Option<WebhookStatus>,
    pub webhook_error: Option<String>,
    pub retry_count: i32,
    pub last_webhook_type: Option<WebhookType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_logs: Option<Vec<ActivityLogData>>,
}

impl From<Project> for ProjectData {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            client_id: project.client_id,
            editor_id: project.editor_id,
            video_idea: project.video_idea,
            deadline: project.deadline,
            status: project.status,
            status_label: project.status.label(),
            status_color: project.status.color(),
            progress: project.status.progress(),
            research_output: project.research_output,
            script: project.script,
            script_feedback: project.script_feedback,
            raw_video_url: project.raw_video_url,
            final_video_url: project.final_video_url,
            webhook_status: project.webhook_status,
            webhook_error: project.webhook_error,
            retry_count: project.retry_count,
            last_webhook_type: project.last_webhook_type,
            created_at: project.created_at,
            updated_at: project.updated_at,
            client: None,
            editor: None,
            activity_logs: None,
        }
    }
}

impl ProjectData {
    /// List row: client and editor names
    pub fn summary(row: ProjectWithRelations) -> Self {
        let client = ClientRef {
            id: row.project.client_id,
            name: row.client_name,
        };
        let editor = row
            .project
            .editor_id
            .zip(row.editor_name)
            .map(|(id, name)| UserRef {
                id,
                name,
                email: None,
            });

        Self {
            client: Some(client),
            editor,
            ..row.project.into()
        }
    }

    /// Detail view: editor email and recent activity
    pub fn detail(row: ProjectWithRelations, logs: Vec<ActivityLogWithUser>) -> Self {
        let editor_email = row.editor_email.clone();
        let mut data = Self::summary(row);
        if let Some(editor) = data.editor.as_mut() {
            editor.email = editor_email;
        }
        data.activity_logs = Some(logs.into_iter().map(ActivityLogData::from).collect());
        data
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogData {
    pub id: ActivityLogId,
    pub action: String,
    pub details: Option<serde_json::Value>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityLogWithUser> for ActivityLogData {
    fn from(row: ActivityLogWithUser) -> Self {
        Self {
            id: row.log.id,
            action: row.log.action,
            details: row.log.details,
            user_id: row.log.user_id,
            user_name: row.user_name,
            created_at: row.log.created_at,
        }
    }
}

/// A project after a workflow action, with the webhook the action fired
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResponse {
    pub project: ProjectData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: i64,
    pub active: i64,
    pub pending_admin_action: i64,
    pub processing: i64,
    pub editor_active: i64,
    pub webhook_errors: i64,
    pub completed_last_7_days: i64,
}

impl From<ProjectCounts> for DashboardStats {
    fn from(counts: ProjectCounts) -> Self {
        Self {
            total: counts.total,
            active: counts.active,
            pending_admin_action: counts.pending_admin_action,
            processing: counts.processing,
            editor_active: counts.editor_active,
            webhook_errors: counts.webhook_errors,
            completed_last_7_days: counts.completed_last_7_days,
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectInput {
    pub video_idea: String,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD`
    pub deadline: String,
    pub client_id: ClientId,
    pub editor_id: Option<UserId>,
}

/// Partial update. `editorId: ""` unassigns, `scriptFeedback: ""` clears.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub video_idea: Option<String>,
    pub deadline: Option<String>,
    pub editor_id: Option<String>,
    pub status: Option<ProjectStatus>,
    pub script_feedback: Option<String>,
    pub final_video_url: Option<String>,
}

impl UpdateProjectInput {
    /// Fields only admins may change
    pub fn touches_admin_fields(&self) -> bool {
        self.video_idea.is_some()
            || self.deadline.is_some()
            || self.editor_id.is_some()
            || self.status.is_some()
            || self.script_feedback.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackInput {
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorInput {
    pub editor_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFinalInput {
    pub final_video_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilters {
    pub status: Option<ProjectStatus>,
    pub client_id: Option<ClientId>,
    pub search: Option<String>,
}

/// Accepts an RFC 3339 timestamp or a calendar date (midnight UTC).
pub fn parse_deadline(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_deadline_formats() {
        let date = parse_deadline("2026-03-01").unwrap();
        assert_eq!((date.year(), date.month(), date.day(), date.hour()), (2026, 3, 1, 0));

        let ts = parse_deadline("2026-03-01T15:30:00+02:00").unwrap();
        assert_eq!(ts.hour(), 13);

        assert!(parse_deadline("next friday").is_none());
        assert!(parse_deadline("").is_none());
    }

    #[test]
    fn test_editor_may_only_touch_final_url() {
        let editor_patch = UpdateProjectInput {
            final_video_url: Some("https://cdn.example.com/final.mp4".to_string()),
            ..Default::default()
        };
        assert!(!editor_patch.touches_admin_fields());

        let admin_patch = UpdateProjectInput {
            status: Some(ProjectStatus::Cancelled),
            ..Default::default()
        };
        assert!(admin_patch.touches_admin_fields());
    }
}
