//! Persisting workflow events
//!
//! Decides with [`ProjectMachine`], then writes the new status (compare-and-set), the
//! columns the event carries and its activity entries in one transaction. STATUS_CHANGED
//! is recorded once per step walked.

use serde_json::{json, Map, Value};
use tracing::info;

use super::machines::{Decision, ProjectMachine, WorkflowEvent};
use super::models::{ActivityAction, ActivityLog, Project, ProjectChanges, ProjectPatch};
use super::status::{validate_transition, ProjectStatus};
use crate::common::{AppError, AppResult, UserId};
use crate::kernel::ServerDeps;

/// What caused a status change, recorded in the activity details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    AdminAction,
    EditorAction,
    AutoWebhook,
    /// Inbound callback from an automation workflow
    Webhook,
    /// Status patched directly by an admin
    Manual,
}

impl Trigger {
    fn detail(&self) -> (&'static str, &'static str) {
        match self {
            Trigger::AdminAction => ("trigger", "admin_action"),
            Trigger::EditorAction => ("trigger", "editor_action"),
            Trigger::AutoWebhook => ("trigger", "auto_webhook"),
            Trigger::Webhook => ("source", "webhook"),
            Trigger::Manual => ("trigger", "manual"),
        }
    }
}

/// Builder for applying a workflow event to a project
///
/// ```ignore
/// let (project, decision) = StatusChange::new(WorkflowEvent::ScriptRejected, Trigger::AdminAction)
///     .by(admin_id)
///     .changes(ProjectChanges {
///         script_feedback: Some(Some(feedback.to_string())),
///         ..Default::default()
///     })
///     .log(ActivityAction::ScriptRejected, json!({ "feedback": feedback }))
///     .apply(&project, deps)
///     .await?;
/// ```
pub struct StatusChange {
    event: WorkflowEvent,
    trigger: Trigger,
    user_id: Option<UserId>,
    extra: Map<String, Value>,
    changes: ProjectChanges,
    logs: Vec<(ActivityAction, Value)>,
}

impl StatusChange {
    pub fn new(event: WorkflowEvent, trigger: Trigger) -> Self {
        Self {
            event,
            trigger,
            user_id: None,
            extra: Map::new(),
            changes: ProjectChanges::default(),
            logs: Vec::new(),
        }
    }

    pub fn by(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Extra field for the STATUS_CHANGED details
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Columns written along with the new status
    pub fn changes(mut self, changes: ProjectChanges) -> Self {
        self.changes = changes;
        self
    }

    /// Activity entry recorded after the STATUS_CHANGED entries
    pub fn log(mut self, action: ActivityAction, details: Value) -> Self {
        self.logs.push((action, details));
        self
    }

    pub async fn apply(self, project: &Project, deps: &ServerDeps) -> AppResult<(Project, Decision)> {
        let pool = &deps.db_pool;
        let decision = ProjectMachine::decide(project.status, self.event)?;

        let mut tx = pool.begin().await?;

        let Some(updated) = Project::transition(
            project.id,
            decision.from,
            decision.to(),
            &self.changes,
            &mut *tx,
        )
        .await?
        else {
            drop(tx);
            // Someone else moved the project first; judge the event against the stored status
            let current = Project::find_by_id(project.id, pool).await?;
            ProjectMachine::decide(current.status, self.event)?;
            return Err(concurrent_change());
        };

        let (key, value) = self.trigger.detail();
        for (from, to) in decision.steps() {
            let mut details = Map::new();
            details.insert("from".to_string(), json!(from));
            details.insert("to".to_string(), json!(to));
            details.insert(key.to_string(), json!(value));
            details.extend(self.extra.clone());

            ActivityLog::record(
                project.id,
                self.user_id,
                ActivityAction::StatusChanged,
                Value::Object(details),
                &mut *tx,
            )
            .await?;
        }

        for (action, details) in self.logs {
            ActivityLog::record(project.id, self.user_id, action, details, &mut *tx).await?;
        }

        tx.commit().await?;

        info!(
            project_id = %project.id,
            from = %decision.from,
            to = %decision.to(),
            event = ?self.event,
            "Project status changed"
        );

        Ok((updated, decision))
    }
}

fn concurrent_change() -> AppError {
    AppError::Conflict("Project status changed concurrently, please retry".to_string())
}

/// Write an admin edit, as a project PATCH does.
///
/// A status move must be a single legal edge; no webhook fires. It is written in the same
/// statement as the other fields, so a lost race leaves the project untouched.
pub async fn apply_patch(
    project: &Project,
    mut patch: ProjectPatch,
    status: Option<ProjectStatus>,
    user_id: UserId,
    deps: &ServerDeps,
) -> AppResult<Project> {
    let pool = &deps.db_pool;

    if let Some(to) = status.filter(|to| *to != project.status) {
        validate_transition(project.status, to)?;
        patch.status = Some((project.status, to));
    }
    if patch.is_empty() {
        return Ok(project.clone());
    }

    let mut tx = pool.begin().await?;

    let updated = Project::update_details(project.id, &patch, &mut *tx)
        .await?
        .ok_or_else(concurrent_change)?;

    if let Some((from, to)) = patch.status {
        let (key, value) = Trigger::Manual.detail();
        let mut details = Map::new();
        details.insert("from".to_string(), json!(from));
        details.insert("to".to_string(), json!(to));
        details.insert(key.to_string(), json!(value));

        ActivityLog::record(
            project.id,
            Some(user_id),
            ActivityAction::StatusChanged,
            Value::Object(details),
            &mut *tx,
        )
        .await?;

        info!(project_id = %project.id, from = %from, to = %to, "Project status patched");
    }

    tx.commit().await?;

    Ok(updated)
}
