use axum::extract::Extension;

use crate::common::AppResult;
use crate::domains::projects::actions;
use crate::domains::projects::data::DashboardStats;
use crate::server::app::AppState;
use crate::server::extract::Json;
use crate::server::middleware::AuthUser;

pub async fn dashboard_stats_handler(
    Extension(state): Extension<AppState>,
    user: AuthUser,
) -> AppResult<Json<DashboardStats>> {
    Ok(Json(
        actions::dashboard_stats(&user.actor(), &state.deps).await?,
    ))
}
