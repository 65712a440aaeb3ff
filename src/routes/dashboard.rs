//! Dashboard routes: aggregated statistics for the overview page.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::ApiResponse;
use crate::middleware::rbac::RequireAdmin;
use crate::services::dashboard::{self, DashboardOverview};
use crate::AppState;

/// GET /api/v1/admin/dashboard — counters and stat cards.
pub async fn overview(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Json<ApiResponse<DashboardOverview>> {
    let overview = dashboard::overview(
        state.store.as_ref(),
        Utc::now(),
        state.config.revenue_window_days,
        &state.config.currency_symbol,
    )
    .await;
    ApiResponse::success(overview)
}
