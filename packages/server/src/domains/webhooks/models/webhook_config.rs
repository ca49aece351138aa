use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::WebhookConfigId;
use crate::domains::webhooks::WebhookType;

/// Stored URL and secret for one webhook type. Overrides the environment fallback.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub id: WebhookConfigId,
    pub name: WebhookType,
    pub url: String,
    pub secret: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WebhookConfig {
    pub async fn find_by_name(name: WebhookType, pool: &PgPool) -> Result<Option<Self>> {
        let config = sqlx::query_as::<_, Self>("SELECT * FROM webhook_configs WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        Ok(config)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>> {
        let configs =
            sqlx::query_as::<_, Self>("SELECT * FROM webhook_configs ORDER BY name::text ASC")
                .fetch_all(pool)
                .await?;
        Ok(configs)
    }

    pub async fn upsert(
        name: WebhookType,
        url: &str,
        secret: Option<&str>,
        is_active: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        let config = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO webhook_configs (id, name, url, secret, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO UPDATE SET
                url = EXCLUDED.url,
                secret = EXCLUDED.secret,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(WebhookConfigId::new())
        .bind(name)
        .bind(url)
        .bind(secret)
        .bind(is_active)
        .fetch_one(pool)
        .await?;
        Ok(config)
    }

    /// URL to use, if this row should be used at all
    pub fn active_url(&self) -> Option<&str> {
        Some(self.url.as_str()).filter(|url| self.is_active && !url.is_empty())
    }
}
