//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::kernel::ServerDeps;
use crate::server::middleware::{jwt_auth_middleware, rate_limited};
use crate::server::routes::{
    auth::*, clients::*, dashboard::*, health_handler, projects::*, users::*, webhooks::*,
};

const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: Arc<ServerDeps>,
}

/// HTTP-level options that do not belong to the domain dependencies
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub auth_rate_limit: bool,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-webhook-secret"),
        ])
}

fn auth_routes(rate_limit: bool) -> Result<Router> {
    let router = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/forgot-password", post(forgot_password_handler))
        .route("/api/auth/reset-password", post(reset_password_handler));

    if rate_limit {
        rate_limited(router)
    } else {
        Ok(router)
    }
}

fn api_routes() -> Router {
    Router::new()
        .route("/api/auth/me", get(me_handler))
        .route("/api/statuses", get(status_catalog_handler))
        .route("/api/dashboard/stats", get(dashboard_stats_handler))
        // Clients
        .route(
            "/api/clients",
            get(list_clients_handler).post(create_client_handler),
        )
        .route(
            "/api/clients/:id",
            get(get_client_handler)
                .patch(update_client_handler)
                .delete(delete_client_handler),
        )
        // Users
        .route(
            "/api/users",
            get(list_users_handler).post(create_user_handler),
        )
        .route(
            "/api/users/:id",
            get(get_user_handler)
                .patch(update_user_handler)
                .delete(delete_user_handler),
        )
        // Projects
        .route(
            "/api/projects",
            get(list_projects_handler).post(create_project_handler),
        )
        .route(
            "/api/projects/:id",
            get(get_project_handler)
                .patch(update_project_handler)
                .delete(delete_project_handler),
        )
        .route(
            "/api/projects/:id/approve-script",
            post(approve_script_handler),
        )
        .route("/api/projects/:id/reject-script", post(reject_script_handler))
        .route("/api/projects/:id/approve-video", post(approve_video_handler))
        .route("/api/projects/:id/reject-video", post(reject_video_handler))
        .route("/api/projects/:id/assign-editor", post(assign_editor_handler))
        .route("/api/projects/:id/start-editing", post(start_editing_handler))
        .route("/api/projects/:id/submit-final", post(submit_final_handler))
        .route(
            "/api/projects/:id/request-changes",
            post(request_changes_handler),
        )
        .route("/api/projects/:id/complete", post(complete_project_handler))
        .route("/api/projects/:id/cancel", post(cancel_project_handler))
        // Webhooks
        .route(
            "/api/webhooks/config",
            get(list_webhook_configs_handler).post(upsert_webhook_config_handler),
        )
        .route("/api/webhooks/test", post(test_webhook_handler))
        .route("/api/webhooks/trigger", post(trigger_webhook_handler))
        .route("/api/webhooks/retry", post(retry_webhook_handler))
        .route("/api/webhooks/callback", post(webhook_callback_handler))
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: AppOptions) -> Result<Router> {
    let jwt_service = deps.jwt_service.clone();
    let state = AppState {
        deps: Arc::new(deps),
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        .merge(auth_routes(options.auth_rate_limit)?)
        .merge(api_routes())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(TraceLayer::new_for_http());

    Ok(app)
}
