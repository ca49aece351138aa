use std::time::{Duration, Instant};

use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;

use crate::server::app::AppState;

const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: &'static str,
    database: DatabaseHealth,
    pool: PoolHealth,
    /// Callbacks are rejected without the shared secret only when one is set
    callback_secret_configured: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    ok: bool,
    latency_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolHealth {
    size: u32,
    idle: usize,
    max: u32,
}

async fn check_database(pool: &PgPool) -> DatabaseHealth {
    let started = Instant::now();
    let error = match tokio::time::timeout(DB_CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(pool))
        .await
    {
        Ok(Ok(_)) => None,
        Ok(Err(e)) => Some(format!("Query failed: {}", e)),
        Err(_) => Some(format!("Query timeout (>{}s)", DB_CHECK_TIMEOUT.as_secs())),
    };

    DatabaseHealth {
        ok: error.is_none(),
        latency_ms: started.elapsed().as_millis(),
        error,
    }
}

/// Liveness plus database reachability. 503 when the database does not answer.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let pool = &state.deps.db_pool;
    let database = check_database(pool).await;

    let (code, status) = if database.ok {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        code,
        Json(HealthResponse {
            status,
            pool: PoolHealth {
                size: pool.size(),
                idle: pool.num_idle(),
                max: pool.options().get_max_connections(),
            },
            callback_secret_configured: state.deps.workflow.webhook_secret.is_some(),
            database,
        }),
    )
}
