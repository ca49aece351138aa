//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly. Emails are randomized so tests sharing
//! the database never collide.

use agency_core::common::{ProjectId, UserId};
use agency_core::domains::auth::password::hash_password;
use agency_core::domains::clients::{Client, ClientFields};
use agency_core::domains::projects::models::{CreateProject, ProjectChanges};
use agency_core::domains::projects::{ActivityLog, Project, ProjectStatus};
use agency_core::domains::users::{CreateUser, User, UserRole};
use agency_core::kernel::ServerDeps;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "password123";

/// A user plus a bearer token for them
pub struct TestUser {
    pub user: User,
    pub token: String,
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@avataragen.test", prefix, Uuid::new_v4().simple())
}

pub async fn create_user(deps: &ServerDeps, role: UserRole, name: &str) -> Result<TestUser> {
    let password_hash = hash_password(TEST_PASSWORD, deps.bcrypt_cost).await?;
    let user = User::create(
        CreateUser {
            name: name.to_string(),
            email: unique_email(&name.to_lowercase().replace(' ', "-")),
            password_hash,
            role,
        },
        &deps.db_pool,
    )
    .await?;

    let token = deps
        .jwt_service
        .create_token(user.id, user.email.clone(), user.role)?;

    Ok(TestUser { user, token })
}

pub async fn create_admin(deps: &ServerDeps) -> Result<TestUser> {
    create_user(deps, UserRole::Admin, "Test Admin").await
}

pub async fn create_editor(deps: &ServerDeps) -> Result<TestUser> {
    create_user(deps, UserRole::Editor, "Test Editor").await
}

pub async fn create_client(pool: &PgPool, name: &str) -> Result<Client> {
    Client::create(
        ClientFields {
            name: name.to_string(),
            content_niche: "Technology".to_string(),
            avatar_id: Some("avatar-123".to_string()),
            voice_id: Some("voice-456".to_string()),
            brand_guidelines_url: Some("https://example.com/brand.pdf".to_string()),
            editing_guidelines_url: None,
            is_active: true,
        },
        pool,
    )
    .await
}

/// Project row in `CREATED`, bypassing the create action and its webhooks
pub async fn create_project(
    pool: &PgPool,
    client: &Client,
    editor_id: Option<UserId>,
) -> Result<Project> {
    Project::create(
        CreateProject {
            client_id: client.id,
            editor_id,
            video_idea: "Ten tips for remote teams".to_string(),
            deadline: Utc::now() + Duration::days(14),
        },
        pool,
    )
    .await
}

/// Walk a project through the legal transitions until it reaches `path`'s last status
pub async fn advance_project(
    pool: &PgPool,
    project: Project,
    path: &[ProjectStatus],
) -> Result<Project> {
    let mut project = project;
    for &to in path {
        project = Project::transition(
            project.id,
            project.status,
            to,
            &ProjectChanges::default(),
            pool,
        )
        .await?
        .with_context(|| format!("project left {} unexpectedly", project.status))?;
    }
    Ok(project)
}

/// Activity action names for a project, oldest first
pub async fn activity_actions(pool: &PgPool, project_id: ProjectId) -> Result<Vec<String>> {
    Ok(ActivityLog::find_for_project(project_id, pool)
        .await?
        .into_iter()
        .map(|log| log.action)
        .collect())
}

pub async fn reload(pool: &PgPool, project_id: ProjectId) -> Result<Project> {
    Project::find_by_id(project_id, pool).await
}
