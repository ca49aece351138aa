//! Outbound webhook payloads
//!
//! Every payload carries the project and client basics; each webhook type adds the
//! fields its workflow needs. Missing optional values are sent as `null`.

use chrono::Utc;
use serde::Serialize;

use super::WebhookType;
use crate::common::{ClientId, ProjectId};
use crate::domains::clients::Client;
use crate::domains::projects::models::Project;
use crate::domains::users::User;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub webhook_type: WebhookType,
    pub timestamp: String,
    pub project_id: ProjectId,
    pub client_id: ClientId,
    pub video_idea: String,
    pub client_name: String,
    pub content_niche: String,
    #[serde(flatten)]
    pub stage: StageFields,
}

/// Per-type payload fields
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StageFields {
    Research {
        #[serde(rename = "brandGuidelinesUrl")]
        brand_guidelines_url: Option<String>,
    },
    Scripting {
        #[serde(rename = "researchOutput")]
        research_output: Option<String>,
        #[serde(rename = "brandGuidelinesUrl")]
        brand_guidelines_url: Option<String>,
    },
    Optimizer {
        script: Option<String>,
        #[serde(rename = "scriptFeedback")]
        script_feedback: Option<String>,
    },
    Production {
        script: Option<String>,
        #[serde(rename = "avatarId")]
        avatar_id: Option<String>,
        #[serde(rename = "voiceId")]
        voice_id: Option<String>,
    },
    Notification {
        #[serde(rename = "notificationType")]
        notification_type: String,
        message: String,
        #[serde(rename = "editorName")]
        editor_name: Option<String>,
        #[serde(rename = "editorEmail")]
        editor_email: Option<String>,
    },
}

impl WebhookPayload {
    fn base(webhook_type: WebhookType, project: &Project, client: &Client, stage: StageFields) -> Self {
        Self {
            webhook_type,
            timestamp: Utc::now().to_rfc3339(),
            project_id: project.id,
            client_id: project.client_id,
            video_idea: project.video_idea.clone(),
            client_name: client.name.clone(),
            content_niche: client.content_niche.clone(),
            stage,
        }
    }

    /// Payload for a pipeline webhook. Notifications use [`WebhookPayload::notification`].
    pub fn pipeline(webhook_type: WebhookType, project: &Project, client: &Client) -> Self {
        let stage = match webhook_type {
            WebhookType::Research => StageFields::Research {
                brand_guidelines_url: client.brand_guidelines_url.clone(),
            },
            WebhookType::Scripting => StageFields::Scripting {
                research_output: project.research_output.clone(),
                brand_guidelines_url: client.brand_guidelines_url.clone(),
            },
            WebhookType::Optimizer => StageFields::Optimizer {
                script: project.script.clone(),
                script_feedback: project.script_feedback.clone(),
            },
            WebhookType::Production => StageFields::Production {
                script: project.script.clone(),
                avatar_id: client.avatar_id.clone(),
                voice_id: client.voice_id.clone(),
            },
            WebhookType::Notification => StageFields::Notification {
                notification_type: "manual".to_string(),
                message: String::new(),
                editor_name: None,
                editor_email: None,
            },
        };
        Self::base(webhook_type, project, client, stage)
    }

    pub fn notification(
        project: &Project,
        client: &Client,
        editor: Option<&User>,
        notification_type: &str,
        message: &str,
    ) -> Self {
        let stage = StageFields::Notification {
            notification_type: notification_type.to_string(),
            message: message.to_string(),
            editor_name: editor.map(|e| e.name.clone()),
            editor_email: editor.map(|e| e.email.clone()),
        };
        Self::base(WebhookType::Notification, project, client, stage)
    }
}

/// Body sent by the connection test
pub fn test_payload() -> serde_json::Value {
    serde_json::json!({
        "type": "test",
        "timestamp": Utc::now().to_rfc3339(),
        "message": "Test connection from Avatar Agency",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::projects::status::ProjectStatus;

    fn fixtures() -> (Project, Client) {
        let now = Utc::now();
        let client = Client {
            id: ClientId::new(),
            name: "Demo Client".to_string(),
            content_niche: "Technology".to_string(),
            avatar_id: Some("demo-avatar-123".to_string()),
            voice_id: Some("demo-voice-456".to_string()),
            brand_guidelines_url: Some("https://drive.google.com/brand".to_string()),
            editing_guidelines_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let project = Project {
            id: ProjectId::new(),
            client_id: client.id,
            editor_id: None,
            video_idea: "Why every startup needs an AI avatar".to_string(),
            deadline: now,
            status: ProjectStatus::ScriptPendingApproval,
            research_output: Some("research notes".to_string()),
            script: Some("the script".to_string()),
            script_feedback: Some("make it punchier".to_string()),
            raw_video_url: None,
            final_video_url: None,
            webhook_status: None,
            webhook_error: None,
            retry_count: 0,
            last_webhook_type: None,
            created_at: now,
            updated_at: now,
        };
        (project, client)
    }

    #[test]
    fn test_research_payload_shape() {
        let (project, client) = fixtures();
        let json = serde_json::to_value(WebhookPayload::pipeline(
            WebhookType::Research,
            &project,
            &client,
        ))
        .unwrap();

        assert_eq!(json["type"], "research");
        assert_eq!(json["projectId"], project.id.to_string());
        assert_eq!(json["clientId"], client.id.to_string());
        assert_eq!(json["clientName"], "Demo Client");
        assert_eq!(json["contentNiche"], "Technology");
        assert_eq!(json["brandGuidelinesUrl"], "https://drive.google.com/brand");
        assert!(json.get("script").is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_optimizer_payload_carries_feedback() {
        let (project, client) = fixtures();
        let json = serde_json::to_value(WebhookPayload::pipeline(
            WebhookType::Optimizer,
            &project,
            &client,
        ))
        .unwrap();

        assert_eq!(json["script"], "the script");
        assert_eq!(json["scriptFeedback"], "make it punchier");
    }

    #[test]
    fn test_production_payload_carries_avatar_and_voice() {
        let (project, client) = fixtures();
        let json = serde_json::to_value(WebhookPayload::pipeline(
            WebhookType::Production,
            &project,
            &client,
        ))
        .unwrap();

        assert_eq!(json["avatarId"], "demo-avatar-123");
        assert_eq!(json["voiceId"], "demo-voice-456");
    }

    #[test]
    fn test_notification_without_editor_sends_nulls() {
        let (project, client) = fixtures();
        let json = serde_json::to_value(WebhookPayload::notification(
            &project,
            &client,
            None,
            "project_completed",
            "done",
        ))
        .unwrap();

        assert_eq!(json["type"], "notification");
        assert_eq!(json["notificationType"], "project_completed");
        assert_eq!(json["message"], "done");
        assert!(json["editorName"].is_null());
        assert!(json["editorEmail"].is_null());
    }
}
