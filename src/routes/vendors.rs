//! Vendor routes: application board and approve/revoke actions.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::services::vendors::{ApprovalOutcome, VendorBoard, VendorBoardView};
use crate::AppState;

const MAX_SEARCH_LEN: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub search: String,
}

impl BoardQuery {
    fn validated(&self) -> Result<&str, AppError> {
        if self.search.chars().count() > MAX_SEARCH_LEN {
            return Err(AppError::Validation(format!(
                "search must be at most {MAX_SEARCH_LEN} characters"
            )));
        }
        Ok(&self.search)
    }
}

/// Board after an approve/revoke, reflecting the action without a re-fetch.
#[derive(Debug, Serialize)]
pub struct VendorActionView {
    pub outcome: ApprovalOutcome,
    pub board: VendorBoardView,
}

/// GET /api/v1/admin/vendors — all applications split into tabs.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<BoardQuery>,
) -> Result<Json<ApiResponse<VendorBoardView>>, AppError> {
    let search = query.validated()?;
    let mut board = VendorBoard::new();
    let notice = board.load(state.store.as_ref()).await;
    Ok(ApiResponse::with_notice(board.view(search), notice))
}

/// POST /api/v1/admin/vendors/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(vendor_id): Path<Uuid>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<ApiResponse<VendorActionView>>, AppError> {
    tracing::info!(admin_id = %admin.id, %vendor_id, "Approving vendor");
    set_approval(&state, vendor_id, true, query.validated()?).await
}

/// POST /api/v1/admin/vendors/{id}/revoke
pub async fn revoke(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(vendor_id): Path<Uuid>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<ApiResponse<VendorActionView>>, AppError> {
    tracing::info!(admin_id = %admin.id, %vendor_id, "Revoking vendor");
    set_approval(&state, vendor_id, false, query.validated()?).await
}

async fn set_approval(
    state: &AppState,
    vendor_id: Uuid,
    approved: bool,
    search: &str,
) -> Result<Json<ApiResponse<VendorActionView>>, AppError> {
    let store = state.store.as_ref();
    let mut board = VendorBoard::new();
    // The write reads the owner from the vendor row, so it does not depend on
    // the board; a failed load only leaves the returned board empty.
    board.load(store).await;

    let outcome = if approved {
        board.approve(store, vendor_id).await
    } else {
        board.revoke(store, vendor_id).await
    };

    let notice = Some(outcome.notice.clone());
    Ok(ApiResponse::with_notice(
        VendorActionView {
            outcome,
            board: board.view(search),
        },
        notice,
    ))
}
