use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Editor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Editor => write!(f, "EDITOR"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "EDITOR" => Ok(UserRole::Editor),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// User model - agency admins and video editors
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,

    // Password reset (only the SHA-256 of the emailed token is kept)
    pub password_reset_token_hash: Option<String>,
    pub password_reset_expires: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User row with the number of projects assigned to them
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithProjectCount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub project_count: i64,
}

/// Input for creating a user. Email must already be normalized, password already hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
}

impl User {
    pub async fn find_by_id(id: UserId, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id_optional(id: UserId, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find by normalized email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;
        Ok(user)
    }

    /// Find a user whose unexpired reset token hashes to `token_hash`
    pub async fn find_by_reset_token_hash(token_hash: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>(
            "SELECT * FROM users
             WHERE password_reset_token_hash = $1
               AND password_reset_expires > NOW()",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;
        Ok(user)
    }

    /// Is the email used by anyone other than `except`?
    pub async fn email_taken(email: &str, except: Option<UserId>, pool: &PgPool) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// List users with their assigned project counts, ordered by name
    pub async fn list_with_project_counts(
        role: Option<UserRole>,
        pool: &PgPool,
    ) -> Result<Vec<UserWithProjectCount>> {
        let users = sqlx::query_as::<_, UserWithProjectCount>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.created_at, u.updated_at,
                   COUNT(p.id) AS project_count
            FROM users u
            LEFT JOIN projects p ON p.editor_id = u.id
            WHERE ($1::user_role IS NULL OR u.role = $1)
            GROUP BY u.id
            ORDER BY u.name ASC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await?;
        Ok(users)
    }

    pub async fn count_assigned_projects(id: UserId, pool: &PgPool) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE editor_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    pub async fn create(input: CreateUser, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(UserId::new())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.role)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn update(id: UserId, input: UpdateUser, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name)
        .bind(input.email)
        .bind(input.password_hash)
        .bind(input.role)
        .fetch_one(pool)
        .await?;
        Ok(user)
    }

    pub async fn delete(id: UserId, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Store a reset token hash, replacing any earlier one
    pub async fn set_reset_token(
        id: UserId,
        token_hash: &str,
        expires: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                password_reset_token_hash = $2,
                password_reset_expires = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Set a new password and consume the reset token in one step.
    /// Returns `None` when the token is unknown, expired or already used.
    pub async fn redeem_reset_token(
        token_hash: &str,
        password_hash: &str,
        pool: &PgPool,
    ) -> Result<Option<UserId>> {
        let id = sqlx::query_scalar::<_, UserId>(
            r#"
            UPDATE users SET
                password_hash = $2,
                password_reset_token_hash = NULL,
                password_reset_expires = NULL,
                updated_at = NOW()
            WHERE password_reset_token_hash = $1 AND password_reset_expires > NOW()
            RETURNING id
            "#,
        )
        .bind(token_hash)
        .bind(password_hash)
        .fetch_optional(pool)
        .await?;
        Ok(id)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
