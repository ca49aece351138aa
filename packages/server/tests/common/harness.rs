//! Test harness with testcontainers for integration testing.
//!
//! One Postgres container and one migration run are shared by every test in a binary.
//! Tests stay independent by creating their own users, clients and projects.

use std::sync::Arc;

use agency_core::config::{WebhookUrls, WorkflowSettings};
use agency_core::kernel::{MockWebhookClient, ServerDeps, TestDependencies};
use agency_core::server::{build_app, AppOptions};
use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Workflow settings with a fallback URL for every webhook type and a callback secret.
pub fn test_workflow() -> WorkflowSettings {
    WorkflowSettings {
        webhook_urls: WebhookUrls {
            research: Some("https://hooks.test/research".to_string()),
            scripting: Some("https://hooks.test/scripting".to_string()),
            optimizer: Some("https://hooks.test/optimizer".to_string()),
            production: Some("https://hooks.test/production".to_string()),
            notification: Some("https://hooks.test/notification".to_string()),
        },
        webhook_secret: Some(TEST_WEBHOOK_SECRET.to_string()),
        ..WorkflowSettings::default()
    }
}

/// Test harness that manages test infrastructure.
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let app = ctx.app();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// App with default test workflow settings and a mock webhook client that answers `200 {}`.
    pub fn app(&self) -> TestApp {
        self.app_with(test_workflow(), MockWebhookClient::new())
    }

    pub fn app_with(&self, workflow: WorkflowSettings, webhooks: MockWebhookClient) -> TestApp {
        let test_deps = TestDependencies::new()
            .mock_webhooks(webhooks)
            .workflow(workflow);
        let webhooks = test_deps.webhook_client.clone();
        let deps = test_deps.into_server_deps(self.db_pool.clone());

        let router = build_app(deps.clone(), AppOptions::default())
            .expect("Failed to build test app");

        TestApp {
            router,
            deps,
            webhooks,
        }
    }
}

/// A router plus handles on the dependencies behind it
pub struct TestApp {
    pub router: Router,
    pub deps: ServerDeps,
    pub webhooks: Arc<MockWebhookClient>,
}
