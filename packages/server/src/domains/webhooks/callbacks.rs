//! Inbound callbacks from the automation workflows
//!
//! A callback reports that a stage finished (or failed). Parsing is pure and reports every
//! problem at once; applying a callback goes through the workflow machine, so a callback
//! that does not fit the project's current status is rejected.

use chrono::DateTime;
use serde::Serialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;

use super::orchestrator::{on_research_complete, WorkflowResult};
use crate::common::utils::is_valid_url;
use crate::common::{AppError, AppResult, ProjectId};
use crate::domains::projects::machines::WorkflowEvent;
use crate::domains::projects::models::{ActivityAction, ActivityLog, Project, ProjectChanges};
use crate::domains::projects::workflow::{StatusChange, Trigger};
use crate::kernel::ServerDeps;

const MAX_TYPE_LENGTH: usize = 50;
const MAX_OUTPUT_LENGTH: usize = 100_000;
const MAX_URL_LENGTH: usize = 2048;
const MAX_ERROR_LENGTH: usize = 5000;
const MAX_MESSAGE_LENGTH: usize = 1000;
const MAX_SOURCE_LENGTH: usize = 100;

const UNKNOWN_ERROR: &str = "Unknown error from webhook";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    ResearchComplete { output: String },
    ScriptComplete { script: String },
    ScriptOptimized { script: String },
    VideoComplete { url: String },
    Error {
        error: Option<String>,
        message: Option<String>,
        source: Option<String>,
    },
}

impl CallbackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CallbackEvent::ResearchComplete { .. } => "research_complete",
            CallbackEvent::ScriptComplete { .. } => "script_complete",
            CallbackEvent::ScriptOptimized { .. } => "script_optimized",
            CallbackEvent::VideoComplete { .. } => "video_complete",
            CallbackEvent::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub project_id: ProjectId,
    pub event: CallbackEvent,
}

/// Response body for an accepted callback
#[derive(Debug, Clone, Serialize)]
pub struct CallbackAck {
    pub success: bool,
}

// =============================================================================
// Authentication
// =============================================================================

/// Check the `X-Webhook-Secret` header against the configured secret.
/// Without a configured secret every callback is accepted.
pub fn verify_secret(provided: Option<&str>, configured: Option<&str>) -> AppResult<()> {
    let Some(expected) = configured.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    match provided {
        Some(provided) if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) => Ok(()),
        _ => Err(AppError::InvalidWebhookSecret),
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Collects validation issues as `path: message`
#[derive(Default)]
struct Issues(Vec<String>);

impl Issues {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        let message = message.into();
        if path.is_empty() {
            self.0.push(message);
        } else {
            self.0.push(format!("{}: {}", path, message));
        }
    }

    fn into_result<T>(self, value: T) -> AppResult<T> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(AppError::Validation(format!(
                "Invalid payload: {}",
                self.0.join("; ")
            )))
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An optional string field with a length cap
fn optional_string(body: &Value, field: &str, max: usize, issues: &mut Issues) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.chars().count() > max => {
            issues.push(field, format!("String must contain at most {} character(s)", max));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            issues.push(field, format!("Expected string, received {}", kind_of(other)));
            None
        }
    }
}

/// First non-empty value among alternative field names
fn first_of(
    body: &Value,
    fields: &[&str],
    max: usize,
    url: bool,
    issues: &mut Issues,
) -> Option<String> {
    let mut found = None;
    for field in fields {
        let value = optional_string(body, field, max, issues);
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            if url && !is_valid_url(&value) {
                issues.push(field, "Invalid url");
                continue;
            }
            found = found.or(Some(value));
        }
    }

    if found.is_none() {
        let names = match fields {
            [a, b, c] => format!("{}, {}, or {}", a, b, c),
            _ => fields.join(", "),
        };
        issues.push("", format!("At least one of {} is required", names));
    }
    found
}

fn non_empty_str<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Parse and validate a callback body.
pub fn parse_callback(body: &Value) -> AppResult<Callback> {
    let (Some(kind), Some(raw_project_id)) =
        (non_empty_str(body, "type"), non_empty_str(body, "projectId"))
    else {
        return Err(AppError::validation("type and projectId are required"));
    };

    let mut issues = Issues::default();

    let too_long = kind.chars().count() > MAX_TYPE_LENGTH;
    if too_long {
        issues.push(
            "type",
            format!("String must contain at most {} character(s)", MAX_TYPE_LENGTH),
        );
    }

    let project_id = match Uuid::parse_str(raw_project_id) {
        Ok(id) => Some(ProjectId::from_uuid(id)),
        Err(_) => {
            issues.push("projectId", "Invalid uuid");
            None
        }
    };

    match body.get("timestamp") {
        None | Some(Value::Null) => {}
        Some(Value::String(ts)) if DateTime::parse_from_rfc3339(ts).is_ok() => {}
        Some(Value::String(_)) => issues.push("timestamp", "Invalid datetime"),
        Some(other) => issues.push(
            "timestamp",
            format!("Expected string, received {}", kind_of(other)),
        ),
    }

    let event = match kind {
        "research_complete" => first_of(
            body,
            &["researchOutput", "output", "result"],
            MAX_OUTPUT_LENGTH,
            false,
            &mut issues,
        )
        .map(|output| CallbackEvent::ResearchComplete { output }),
        "script_complete" => first_of(
            body,
            &["script", "output", "result"],
            MAX_OUTPUT_LENGTH,
            false,
            &mut issues,
        )
        .map(|script| CallbackEvent::ScriptComplete { script }),
        "script_optimized" => first_of(
            body,
            &["script", "output", "result"],
            MAX_OUTPUT_LENGTH,
            false,
            &mut issues,
        )
        .map(|script| CallbackEvent::ScriptOptimized { script }),
        "video_complete" => first_of(
            body,
            &["videoUrl", "rawVideoUrl", "url"],
            MAX_URL_LENGTH,
            true,
            &mut issues,
        )
        .map(|url| CallbackEvent::VideoComplete { url }),
        "error" => Some(CallbackEvent::Error {
            error: optional_string(body, "error", MAX_ERROR_LENGTH, &mut issues),
            message: optional_string(body, "message", MAX_MESSAGE_LENGTH, &mut issues),
            source: optional_string(body, "source", MAX_SOURCE_LENGTH, &mut issues),
        }),
        _ if too_long => None,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown callback type: {}",
                other
            )))
        }
    };

    match (project_id, event, issues.into_result(())) {
        (Some(project_id), Some(event), Ok(())) => Ok(Callback { project_id, event }),
        (_, _, Err(e)) => Err(e),
        _ => Err(AppError::validation("Invalid payload")),
    }
}

// =============================================================================
// Applying
// =============================================================================

/// What a callback changed
#[derive(Debug, Clone)]
pub struct CallbackResult {
    pub project: Project,
    /// Set when the callback chained straight into the next stage
    pub advanced: Option<WorkflowResult>,
}

/// Apply a delivery event, storing what it carries and marking the stage's webhook done.
async fn deliver(
    project: &Project,
    event: WorkflowEvent,
    changes: ProjectChanges,
    optimized: bool,
    deps: &ServerDeps,
) -> AppResult<Project> {
    let mut change = StatusChange::new(event, Trigger::Webhook).changes(ProjectChanges {
        webhook_success: true,
        ..changes
    });
    if optimized {
        change = change.with_detail("optimized", json!(true));
    }
    let (project, _) = change.apply(project, deps).await?;
    Ok(project)
}

/// The first non-empty of the reported error and message
fn reported_error(error: Option<String>, message: Option<String>) -> Option<String> {
    error
        .filter(|e| !e.is_empty())
        .or(message.filter(|m| !m.is_empty()))
}

/// Apply a parsed callback to its project.
pub async fn handle_callback(callback: Callback, deps: &ServerDeps) -> AppResult<CallbackResult> {
    let pool = &deps.db_pool;
    let project = Project::find_by_id_optional(callback.project_id, pool)
        .await?
        .ok_or(AppError::NotFound("Project"))?;

    info!(
        project_id = %project.id,
        callback = callback.event.name(),
        status = %project.status,
        "Webhook callback received"
    );

    let project = match callback.event {
        CallbackEvent::ResearchComplete { output } => {
            let changes = ProjectChanges {
                research_output: Some(output),
                ..Default::default()
            };
            let project =
                deliver(&project, WorkflowEvent::ResearchCompleted, changes, false, deps).await?;

            if !deps.workflow.auto_advance {
                return Ok(CallbackResult {
                    project,
                    advanced: None,
                });
            }

            let advanced = on_research_complete(&project, deps).await?;
            return Ok(CallbackResult {
                project: advanced.project.clone(),
                advanced: Some(advanced),
            });
        }
        CallbackEvent::ScriptComplete { script } => {
            let changes = ProjectChanges {
                script: Some(script),
                ..Default::default()
            };
            deliver(&project, WorkflowEvent::ScriptDelivered, changes, false, deps).await?
        }
        CallbackEvent::ScriptOptimized { script } => {
            let changes = ProjectChanges {
                script: Some(script),
                script_feedback: Some(None),
                ..Default::default()
            };
            deliver(&project, WorkflowEvent::ScriptDelivered, changes, true, deps).await?
        }
        CallbackEvent::VideoComplete { url } => {
            let changes = ProjectChanges {
                raw_video_url: Some(url),
                ..Default::default()
            };
            deliver(&project, WorkflowEvent::VideoDelivered, changes, false, deps).await?
        }
        CallbackEvent::Error {
            error,
            message,
            source,
        } => {
            let reported = reported_error(error, message);
            let stored = reported.as_deref().unwrap_or(UNKNOWN_ERROR);

            let mut tx = pool.begin().await?;
            Project::mark_webhook_error(project.id, stored, &mut *tx).await?;
            ActivityLog::record(
                project.id,
                None,
                ActivityAction::WebhookFailed,
                json!({ "error": reported, "source": source }),
                &mut *tx,
            )
            .await?;
            tx.commit().await?;

            warn!(project_id = %project.id, error = %stored, "Workflow reported an error");

            Project::find_by_id(project.id, pool).await?
        }
    };

    Ok(CallbackResult {
        project,
        advanced: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_ID: &str = "0190f6a4-6c3e-7a8b-9c0d-1e2f3a4b5c6d";

    fn error_message(result: AppResult<Callback>) -> String {
        match result {
            Err(AppError::Validation(message)) => message,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_or_project() {
        for body in [
            json!({ "projectId": PROJECT_ID }),
            json!({ "type": "script_complete" }),
            json!({ "type": "", "projectId": PROJECT_ID }),
        ] {
            assert_eq!(
                error_message(parse_callback(&body)),
                "type and projectId are required"
            );
        }
    }

    #[test]
    fn test_research_output_alternatives() {
        let body = json!({
            "type": "research_complete",
            "projectId": PROJECT_ID,
            "output": "Findings",
            "timestamp": "2026-01-15T10:00:00Z"
        });
        let callback = parse_callback(&body).unwrap();
        assert_eq!(
            callback.event,
            CallbackEvent::ResearchComplete {
                output: "Findings".to_string()
            }
        );
        assert_eq!(callback.project_id.to_string(), PROJECT_ID);
    }

    #[test]
    fn test_first_present_field_wins() {
        let body = json!({
            "type": "script_optimized",
            "projectId": PROJECT_ID,
            "script": "",
            "output": "Better script",
            "result": "Ignored"
        });
        let callback = parse_callback(&body).unwrap();
        assert_eq!(
            callback.event,
            CallbackEvent::ScriptOptimized {
                script: "Better script".to_string()
            }
        );
    }

    #[test]
    fn test_missing_output_is_reported() {
        let body = json!({ "type": "script_complete", "projectId": PROJECT_ID });
        assert_eq!(
            error_message(parse_callback(&body)),
            "Invalid payload: At least one of script, output, or result is required"
        );
    }

    #[test]
    fn test_issues_are_aggregated() {
        let body = json!({
            "type": "video_complete",
            "projectId": "not-a-uuid",
            "timestamp": "yesterday",
            "videoUrl": "not a url"
        });
        let message = error_message(parse_callback(&body));
        assert!(message.starts_with("Invalid payload: "));
        assert!(message.contains("projectId: Invalid uuid"));
        assert!(message.contains("timestamp: Invalid datetime"));
        assert!(message.contains("videoUrl: Invalid url"));
    }

    #[test]
    fn test_output_length_cap() {
        let body = json!({
            "type": "research_complete",
            "projectId": PROJECT_ID,
            "researchOutput": "x".repeat(MAX_OUTPUT_LENGTH + 1)
        });
        let message = error_message(parse_callback(&body));
        assert!(message.contains("researchOutput: String must contain at most 100000 character(s)"));
    }

    #[test]
    fn test_video_url() {
        let body = json!({
            "type": "video_complete",
            "projectId": PROJECT_ID,
            "rawVideoUrl": "https://cdn.example.com/raw.mp4"
        });
        assert_eq!(
            parse_callback(&body).unwrap().event,
            CallbackEvent::VideoComplete {
                url: "https://cdn.example.com/raw.mp4".to_string()
            }
        );
    }

    #[test]
    fn test_error_callback_fields_are_optional() {
        let body = json!({ "type": "error", "projectId": PROJECT_ID, "source": "heygen" });
        assert_eq!(
            parse_callback(&body).unwrap().event,
            CallbackEvent::Error {
                error: None,
                message: None,
                source: Some("heygen".to_string())
            }
        );

        let body = json!({ "type": "error", "projectId": PROJECT_ID, "error": 42 });
        assert_eq!(
            error_message(parse_callback(&body)),
            "Invalid payload: error: Expected string, received number"
        );
    }

    #[test]
    fn test_empty_error_falls_back_to_message() {
        let body = json!({
            "type": "error",
            "projectId": PROJECT_ID,
            "error": "",
            "message": "HeyGen quota exceeded"
        });
        let CallbackEvent::Error { error, message, .. } = parse_callback(&body).unwrap().event
        else {
            panic!("expected error callback");
        };
        assert_eq!(
            reported_error(error, message).as_deref(),
            Some("HeyGen quota exceeded")
        );

        assert_eq!(
            reported_error(Some(String::new()), Some(String::new())),
            None
        );
        assert_eq!(
            reported_error(Some("render failed".into()), Some("ignored".into())).as_deref(),
            Some("render failed")
        );
    }

    #[test]
    fn test_overlong_type_is_reported_before_unknown() {
        let kind = "t".repeat(MAX_TYPE_LENGTH + 1);
        let body = json!({ "type": kind, "projectId": PROJECT_ID });
        assert_eq!(
            error_message(parse_callback(&body)),
            "Invalid payload: type: String must contain at most 50 character(s)"
        );
    }

    #[test]
    fn test_unknown_type() {
        let body = json!({ "type": "thumbnail_complete", "projectId": PROJECT_ID });
        assert_eq!(
            error_message(parse_callback(&body)),
            "Unknown callback type: thumbnail_complete"
        );
    }

    #[test]
    fn test_secret_check() {
        assert!(verify_secret(None, None).is_ok());
        assert!(verify_secret(Some("anything"), None).is_ok());
        assert!(verify_secret(Some("s3cret"), Some("s3cret")).is_ok());
        assert!(matches!(
            verify_secret(Some("wrong"), Some("s3cret")),
            Err(AppError::InvalidWebhookSecret)
        ));
        assert!(matches!(
            verify_secret(None, Some("s3cret")),
            Err(AppError::InvalidWebhookSecret)
        ));
        assert!(matches!(
            verify_secret(Some("s3cret-longer"), Some("s3cret")),
            Err(AppError::InvalidWebhookSecret)
        ));
    }
}
