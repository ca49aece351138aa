use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::ClientId;

/// Client model - a brand the agency produces videos for
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub content_niche: String,

    // Production settings handed to the automation workflows
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub brand_guidelines_url: Option<String>,
    pub editing_guidelines_url: Option<String>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client row with its project count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientWithProjectCount {
    #[sqlx(flatten)]
    pub client: Client,
    pub project_count: i64,
}

/// Full set of writable columns, used for both insert and update
#[derive(Debug, Clone)]
pub struct ClientFields {
    pub name: String,
    pub content_niche: String,
    pub avatar_id: Option<String>,
    pub voice_id: Option<String>,
    pub brand_guidelines_url: Option<String>,
    pub editing_guidelines_url: Option<String>,
    pub is_active: bool,
}

impl From<&Client> for ClientFields {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            content_niche: client.content_niche.clone(),
            avatar_id: client.avatar_id.clone(),
            voice_id: client.voice_id.clone(),
            brand_guidelines_url: client.brand_guidelines_url.clone(),
            editing_guidelines_url: client.editing_guidelines_url.clone(),
            is_active: client.is_active,
        }
    }
}

const SELECT_WITH_COUNT: &str = r#"
    SELECT c.*, (SELECT COUNT(*) FROM projects p WHERE p.client_id = c.id) AS project_count
    FROM clients c
"#;

impl Client {
    pub async fn find_by_id_optional(id: ClientId, pool: &PgPool) -> Result<Option<Self>> {
        let client = sqlx::query_as::<_, Self>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(client)
    }

    pub async fn find_with_project_count(
        id: ClientId,
        pool: &PgPool,
    ) -> Result<Option<ClientWithProjectCount>> {
        let client = sqlx::query_as::<_, ClientWithProjectCount>(&format!(
            "{} WHERE c.id = $1",
            SELECT_WITH_COUNT
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(client)
    }

    /// All clients ordered by name
    pub async fn list_with_project_counts(pool: &PgPool) -> Result<Vec<ClientWithProjectCount>> {
        let clients = sqlx::query_as::<_, ClientWithProjectCount>(&format!(
            "{} ORDER BY c.name ASC",
            SELECT_WITH_COUNT
        ))
        .fetch_all(pool)
        .await?;
        Ok(clients)
    }

    pub async fn count_projects(id: ClientId, pool: &PgPool) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE client_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    pub async fn create(fields: ClientFields, pool: &PgPool) -> Result<Self> {
        let client = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO clients (
                id, name, content_niche, avatar_id, voice_id,
                brand_guidelines_url, editing_guidelines_url, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(ClientId::new())
        .bind(&fields.name)
        .bind(&fields.content_niche)
        .bind(&fields.avatar_id)
        .bind(&fields.voice_id)
        .bind(&fields.brand_guidelines_url)
        .bind(&fields.editing_guidelines_url)
        .bind(fields.is_active)
        .fetch_one(pool)
        .await?;
        Ok(client)
    }

    pub async fn update(id: ClientId, fields: ClientFields, pool: &PgPool) -> Result<Self> {
        let client = sqlx::query_as::<_, Self>(
            r#"
            UPDATE clients SET
                name = $2,
                content_niche = $3,
                avatar_id = $4,
                voice_id = $5,
                brand_guidelines_url = $6,
                editing_guidelines_url = $7,
                is_active = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.content_niche)
        .bind(&fields.avatar_id)
        .bind(&fields.voice_id)
        .bind(&fields.brand_guidelines_url)
        .bind(&fields.editing_guidelines_url)
        .bind(fields.is_active)
        .fetch_one(pool)
        .await?;
        Ok(client)
    }

    pub async fn delete(id: ClientId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
