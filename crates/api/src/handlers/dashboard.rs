//! Handler for the home dashboard.

use axum::extract::State;
use axum::Json;
use docbuilder_db::models::dashboard::{SiteStats, UserStats};
use docbuilder_db::repositories::DashboardRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::MaybeAuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub site: SiteStats,
    /// Present only for authenticated callers.
    pub user: Option<UserStats>,
}

/// GET /api/v1/dashboard
pub async fn get_dashboard(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
) -> AppResult<Json<DataResponse<Dashboard>>> {
    let site = DashboardRepo::site_stats(&state.pool).await?;
    let user = match caller.user_id() {
        Some(user_id) => Some(DashboardRepo::user_stats(&state.pool, user_id).await?),
        None => None,
    };
    Ok(Json(DataResponse {
        data: Dashboard { site, user },
    }))
}
