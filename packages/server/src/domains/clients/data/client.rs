use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ClientId;
use crate::domains::clients::models::{Client, ClientWithProjectCount};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    pub id: ClientId,
    pub name: String,
    pub content_niche: String,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub brand_guidelines_url: Option<String>,
    pub editing_guidelines_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_count: Option<i64>,
}

impl From<Client> for ClientData {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            content_niche: client.content_niche,
            avatar_id: client.avatar_id,
            voice_id: client.voice_id,
            brand_guidelines_url: client.brand_guidelines_url,
            editing_guidelines_url: client.editing_guidelines_url,
            is_active: client.is_active,
            created_at: client.created_at,
            updated_at: client.updated_at,
            project_count: None,
        }
    }
}

impl From<ClientWithProjectCount> for ClientData {
    fn from(row: ClientWithProjectCount) -> Self {
        Self {
            project_count: Some(row.project_count),
            ..row.client.into()
        }
    }
}

/// Compact reference embedded in project responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    pub id: ClientId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientInput {
    pub name: String,
    pub content_niche: String,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub brand_guidelines_url: Option<String>,
    pub editing_guidelines_url: Option<String>,
}

/// Partial update: absent fields stay, empty strings clear optional fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub content_niche: Option<String>,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub brand_guidelines_url: Option<String>,
    pub editing_guidelines_url: Option<String>,
    pub is_active: Option<bool>,
}
