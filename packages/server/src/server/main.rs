// Main entry point for API server

use std::sync::Arc;
use std::time::Duration;

use agency_core::domains::auth::JwtService;
use agency_core::kernel::{HttpWebhookClient, ServerDeps};
use agency_core::server::{build_app, AppOptions};
use agency_core::Config;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agency_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Avatar Agency API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    if config.workflow.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET is not set; webhook callbacks are not authenticated");
    }

    let webhook_client = HttpWebhookClient::new(Duration::from_secs(
        config.workflow.webhook_timeout_secs,
    ))?;
    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone());

    let deps = ServerDeps::new(
        pool,
        Arc::new(webhook_client),
        Arc::new(jwt_service),
        config.workflow.clone(),
        config.bcrypt_cost,
        config.public_url.clone(),
        config.dev_mode,
    );

    // Build application
    let app = build_app(
        deps,
        AppOptions {
            allowed_origins: config.allowed_origins.clone(),
            auth_rate_limit: config.auth_rate_limit_enabled,
        },
    )?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
