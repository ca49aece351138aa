//! Integration tests for client and user management.

mod common;

use axum::http::StatusCode;
use common::http::{delete, get, patch, post};
use common::{
    create_admin, create_client, create_editor, create_project, unique_email, TestHarness,
};
use serde_json::json;
use test_context::test_context;

// =============================================================================
// Clients
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_creates_and_updates_client(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();

    let created = post("/api/clients")
        .token(&admin.token)
        .json(json!({
            "name": "Acme Studio",
            "contentNiche": "Finance",
            "avatarId": "avatar-1",
            "brandGuidelinesUrl": "https://acme.example.com/brand"
        }))
        .send(&app.router)
        .await;

    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["name"], "Acme Studio");
    assert_eq!(created.body["isActive"], true);
    let id = created.body["id"].as_str().unwrap().to_string();

    let updated = patch(&format!("/api/clients/{}", id))
        .token(&admin.token)
        .json(json!({ "contentNiche": "Personal finance", "isActive": false }))
        .send(&app.router)
        .await;

    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Acme Studio");
    assert_eq!(updated.body["contentNiche"], "Personal finance");
    assert_eq!(updated.body["isActive"], false);

    let fetched = get(&format!("/api/clients/{}", id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["projectCount"], 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn client_input_is_validated(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();

    let short_name = post("/api/clients")
        .token(&admin.token)
        .json(json!({ "name": "A", "contentNiche": "Finance" }))
        .send(&app.router)
        .await;
    assert_eq!(short_name.status, StatusCode::BAD_REQUEST);
    assert_eq!(short_name.error(), "Name must be at least 2 characters");

    let bad_url = post("/api/clients")
        .token(&admin.token)
        .json(json!({
            "name": "Acme Studio",
            "contentNiche": "Finance",
            "brandGuidelinesUrl": "not a url"
        }))
        .send(&app.router)
        .await;
    assert_eq!(bad_url.status, StatusCode::BAD_REQUEST);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn editors_can_read_but_not_manage_clients(ctx: &TestHarness) {
    let app = ctx.app();
    let editor = create_editor(&app.deps).await.unwrap();
    let client = create_client(&ctx.db_pool, "Readable Client").await.unwrap();

    let read = get(&format!("/api/clients/{}", client.id))
        .token(&editor.token)
        .send(&app.router)
        .await;
    assert_eq!(read.status, StatusCode::OK);

    let write = post("/api/clients")
        .token(&editor.token)
        .json(json!({ "name": "Sneaky Client", "contentNiche": "Finance" }))
        .send(&app.router)
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);
    assert_eq!(write.error(), "Admin access required");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn client_with_projects_cannot_be_deleted(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();
    let client = create_client(&ctx.db_pool, "Busy Client").await.unwrap();
    create_project(&ctx.db_pool, &client, None).await.unwrap();

    let res = delete(&format!("/api/clients/{}", client.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Cannot delete client with 1 projects");

    let idle = create_client(&ctx.db_pool, "Idle Client").await.unwrap();
    let res = delete(&format!("/api/clients/{}", idle.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);

    let gone = get(&format!("/api/clients/{}", idle.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Users
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_creates_editor_and_rejects_duplicate_email(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();
    let email = unique_email("new-editor");

    let created = post("/api/users")
        .token(&admin.token)
        .json(json!({ "name": "New Editor", "email": email, "password": "password123" }))
        .send(&app.router)
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["role"], "EDITOR");
    assert_eq!(created.body["email"], email);

    let duplicate = post("/api/users")
        .token(&admin.token)
        .json(json!({
            "name": "Same Person",
            "email": email.to_uppercase(),
            "password": "password123"
        }))
        .send(&app.router)
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.error(), "Email already exists");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn editors_only_read_themselves(ctx: &TestHarness) {
    let app = ctx.app();
    let editor = create_editor(&app.deps).await.unwrap();
    let other = create_editor(&app.deps).await.unwrap();

    let own = get(&format!("/api/users/{}", editor.user.id))
        .token(&editor.token)
        .send(&app.router)
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["projectCount"], 0);

    let someone_else = get(&format!("/api/users/{}", other.user.id))
        .token(&editor.token)
        .send(&app.router)
        .await;
    assert_eq!(someone_else.status, StatusCode::FORBIDDEN);

    let listing = get("/api/users")
        .token(&editor.token)
        .send(&app.router)
        .await;
    assert_eq!(listing.status, StatusCode::FORBIDDEN);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn user_deletion_rules(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();
    let busy = create_editor(&app.deps).await.unwrap();
    let idle = create_editor(&app.deps).await.unwrap();
    let client = create_client(&ctx.db_pool, "Editor Client").await.unwrap();
    create_project(&ctx.db_pool, &client, Some(busy.user.id))
        .await
        .unwrap();

    let self_delete = delete(&format!("/api/users/{}", admin.user.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(self_delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(self_delete.error(), "Cannot delete your own account");

    let assigned = delete(&format!("/api/users/{}", busy.user.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(assigned.status, StatusCode::BAD_REQUEST);
    assert_eq!(assigned.error(), "Cannot delete user with 1 assigned projects");

    let ok = delete(&format!("/api/users/{}", idle.user.id))
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_ids_are_not_found(ctx: &TestHarness) {
    let app = ctx.app();
    let admin = create_admin(&app.deps).await.unwrap();

    let res = get("/api/users/not-a-uuid")
        .token(&admin.token)
        .send(&app.router)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "User not found");
}
