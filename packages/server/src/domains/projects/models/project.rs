use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::common::{ClientId, ProjectId, UserId};
use crate::domains::projects::status::ProjectStatus;
use crate::domains::webhooks::{WebhookStatus, WebhookType};

/// Project model - one video moving through the production pipeline
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Project {
    pub id: ProjectId,
    pub client_id: ClientId,
    pub editor_id: Option<UserId>,
    pub video_idea: String,
    pub deadline: DateTime<Utc>,
    pub status: ProjectStatus,

    // Deliverables from the automation workflows and the editor
    pub research_output: Option<String>,
    pub script: Option<String>,
    pub script_feedback: Option<String>,
    pub raw_video_url: Option<String>,
    pub final_video_url: Option<String>,

    // Webhook tracking
    pub webhook_status: Option<WebhookStatus>,
    pub webhook_error: Option<String>,
    pub retry_count: i32,
    pub last_webhook_type: Option<WebhookType>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project joined with the names needed for listings and detail views
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectWithRelations {
    #[sqlx(flatten)]
    pub project: Project,
    pub client_name: String,
    pub editor_name: Option<String>,
    pub editor_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateProject {
    pub client_id: ClientId,
    pub editor_id: Option<UserId>,
    pub video_idea: String,
    pub deadline: DateTime<Utc>,
}

/// Columns written together with a status change. `None` leaves a column as it is.
#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub research_output: Option<String>,
    pub script: Option<String>,
    /// `Some(None)` clears the feedback
    pub script_feedback: Option<Option<String>>,
    pub raw_video_url: Option<String>,
    pub final_video_url: Option<String>,
    pub editor_id: Option<UserId>,
    /// The stage's workflow delivered its result
    pub webhook_success: bool,
}

/// Admin edit of a project. Only the fields present are written.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub video_idea: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    /// `Some(None)` unassigns the editor
    pub editor_id: Option<Option<UserId>>,
    pub script_feedback: Option<Option<String>>,
    pub final_video_url: Option<Option<String>>,
    /// `(from, to)`: applied only while the project is still in `from`
    pub status: Option<(ProjectStatus, ProjectStatus)>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.video_idea.is_none()
            && self.deadline.is_none()
            && self.editor_id.is_none()
            && self.script_feedback.is_none()
            && self.final_video_url.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub status: Option<ProjectStatus>,
    pub client_id: Option<ClientId>,
    pub editor_id: Option<UserId>,
    pub search: Option<String>,
}

/// Counts behind the dashboard cards
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ProjectCounts {
    pub total: i64,
    pub active: i64,
    pub pending_admin_action: i64,
    pub processing: i64,
    pub editor_active: i64,
    pub webhook_errors: i64,
    pub completed_last_7_days: i64,
}

const SELECT_WITH_RELATIONS: &str = r#"
    SELECT p.*, c.name AS client_name, e.name AS editor_name, e.email AS editor_email
    FROM projects p
    JOIN clients c ON c.id = p.client_id
    LEFT JOIN users e ON e.id = p.editor_id
"#;

impl Project {
    pub async fn find_by_id(id: ProjectId, pool: &PgPool) -> Result<Self> {
        let project = sqlx::query_as::<_, Self>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(project)
    }

    pub async fn find_by_id_optional(id: ProjectId, pool: &PgPool) -> Result<Option<Self>> {
        let project = sqlx::query_as::<_, Self>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(project)
    }

    pub async fn find_with_relations(
        id: ProjectId,
        pool: &PgPool,
    ) -> Result<Option<ProjectWithRelations>> {
        let project = sqlx::query_as::<_, ProjectWithRelations>(&format!(
            "{} WHERE p.id = $1",
            SELECT_WITH_RELATIONS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(project)
    }

    /// Newest first. Search matches the video idea or client name, case-insensitively.
    pub async fn list(filter: &ProjectFilter, pool: &PgPool) -> Result<Vec<ProjectWithRelations>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let projects = sqlx::query_as::<_, ProjectWithRelations>(&format!(
            r#"{}
            WHERE ($1::project_status IS NULL OR p.status = $1)
              AND ($2::uuid IS NULL OR p.client_id = $2)
              AND ($3::uuid IS NULL OR p.editor_id = $3)
              AND ($4::text IS NULL OR p.video_idea ILIKE $4 OR c.name ILIKE $4)
            ORDER BY p.created_at DESC, p.id DESC"#,
            SELECT_WITH_RELATIONS
        ))
        .bind(filter.status)
        .bind(filter.client_id)
        .bind(filter.editor_id)
        .bind(search)
        .fetch_all(pool)
        .await?;
        Ok(projects)
    }

    pub async fn create<'e>(input: CreateProject, executor: impl PgExecutor<'e>) -> Result<Self> {
        let project = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO projects (id, client_id, editor_id, video_idea, deadline, status)
            VALUES ($1, $2, $3, $4, $5, 'CREATED')
            RETURNING *
            "#,
        )
        .bind(ProjectId::new())
        .bind(input.client_id)
        .bind(input.editor_id)
        .bind(&input.video_idea)
        .bind(input.deadline)
        .fetch_one(executor)
        .await?;
        Ok(project)
    }

    /// Write the fields present in `patch`. Returns `None` when the patch carries a status
    /// move and the project has left its `from` status.
    pub async fn update_details<'e>(
        id: ProjectId,
        patch: &ProjectPatch,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let (expected, status) = patch.status.unzip();
        let project = sqlx::query_as::<_, Self>(
            r#"
            UPDATE projects SET
                video_idea = COALESCE($2, video_idea),
                deadline = COALESCE($3, deadline),
                editor_id = CASE WHEN $4 THEN $5 ELSE editor_id END,
                script_feedback = CASE WHEN $6 THEN $7 ELSE script_feedback END,
                final_video_url = CASE WHEN $8 THEN $9 ELSE final_video_url END,
                status = COALESCE($11, status),
                updated_at = NOW()
            WHERE id = $1 AND ($10::project_status IS NULL OR status = $10)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.video_idea)
        .bind(patch.deadline)
        .bind(patch.editor_id.is_some())
        .bind(patch.editor_id.flatten())
        .bind(patch.script_feedback.is_some())
        .bind(patch.script_feedback.clone().flatten())
        .bind(patch.final_video_url.is_some())
        .bind(patch.final_video_url.clone().flatten())
        .bind(expected)
        .bind(status)
        .fetch_optional(executor)
        .await?;
        Ok(project)
    }

    pub async fn delete(id: ProjectId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Compare-and-set the status and write `changes` in the same statement.
    /// Returns `None` if the project is no longer in `from`.
    pub async fn transition<'e>(
        id: ProjectId,
        from: ProjectStatus,
        to: ProjectStatus,
        changes: &ProjectChanges,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<Self>> {
        let project = sqlx::query_as::<_, Self>(
            r#"
            UPDATE projects SET
                status = $3,
                research_output = COALESCE($4, research_output),
                script = COALESCE($5, script),
                script_feedback = CASE WHEN $6 THEN $7 ELSE script_feedback END,
                raw_video_url = COALESCE($8, raw_video_url),
                final_video_url = COALESCE($9, final_video_url),
                editor_id = COALESCE($10, editor_id),
                webhook_status = CASE WHEN $11 THEN 'success'::webhook_status ELSE webhook_status END,
                webhook_error = CASE WHEN $11 THEN NULL ELSE webhook_error END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(&changes.research_output)
        .bind(&changes.script)
        .bind(changes.script_feedback.is_some())
        .bind(changes.script_feedback.clone().flatten())
        .bind(&changes.raw_video_url)
        .bind(&changes.final_video_url)
        .bind(changes.editor_id)
        .bind(changes.webhook_success)
        .fetch_optional(executor)
        .await?;
        Ok(project)
    }

    pub async fn set_editor<'e>(
        id: ProjectId,
        editor_id: UserId,
        executor: impl PgExecutor<'e>,
    ) -> Result<Self> {
        let project = sqlx::query_as::<_, Self>(
            "UPDATE projects SET editor_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(editor_id)
        .fetch_one(executor)
        .await?;
        Ok(project)
    }

    // =========================================================================
    // Webhook tracking
    // =========================================================================

    /// A pipeline webhook is about to be sent
    pub async fn mark_webhook_pending(
        id: ProjectId,
        webhook_type: WebhookType,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects SET
                webhook_status = 'pending',
                webhook_error = NULL,
                last_webhook_type = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(webhook_type)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_webhook_success(id: ProjectId, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects SET webhook_status = 'success', webhook_error = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn mark_webhook_error<'e>(
        id: ProjectId,
        error: &str,
        executor: impl PgExecutor<'e>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects SET webhook_status = 'error', webhook_error = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Claim a retry: only succeeds while the webhook is failed and retries remain.
    /// Returns the new retry count.
    pub async fn claim_retry<'e>(
        id: ProjectId,
        max_retries: i32,
        executor: impl PgExecutor<'e>,
    ) -> Result<Option<i32>> {
        let count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE projects SET
                retry_count = retry_count + 1,
                webhook_status = 'pending',
                webhook_error = NULL,
                updated_at = NOW()
            WHERE id = $1 AND webhook_status = 'error' AND retry_count < $2
            RETURNING retry_count
            "#,
        )
        .bind(id)
        .bind(max_retries)
        .fetch_optional(executor)
        .await?;
        Ok(count)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Dashboard counts, optionally limited to one editor's projects
    pub async fn counts(editor_id: Option<UserId>, pool: &PgPool) -> Result<ProjectCounts> {
        let counts = sqlx::query_as::<_, ProjectCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = ANY($2)) AS active,
                COUNT(*) FILTER (WHERE status = ANY($3)) AS pending_admin_action,
                COUNT(*) FILTER (WHERE status = ANY($4)) AS processing,
                COUNT(*) FILTER (WHERE status = ANY($5)) AS editor_active,
                COUNT(*) FILTER (WHERE webhook_status = 'error') AS webhook_errors,
                COUNT(*) FILTER (
                    WHERE status = 'COMPLETED' AND updated_at >= NOW() - INTERVAL '7 days'
                ) AS completed_last_7_days
            FROM projects
            WHERE ($1::uuid IS NULL OR editor_id = $1)
            "#,
        )
        .bind(editor_id)
        .bind(ProjectStatus::ACTIVE)
        .bind(ProjectStatus::REQUIRES_ADMIN_ACTION)
        .bind(ProjectStatus::PROCESSING)
        .bind(ProjectStatus::EDITOR_ACTIVE)
        .fetch_one(pool)
        .await?;
        Ok(counts)
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_now"), "50\\% off\\_now");
        assert_eq!(escape_like("plain"), "plain");
    }
}
