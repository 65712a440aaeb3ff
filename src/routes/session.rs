//! Admin session routes: guard resolution and sign-out.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::{CurrentSession, MaybeSession};
use crate::services::admin_guard::{AdminGuard, AdminStatus, REDIRECT_PATH};
use crate::AppState;

/// Settled guard state as the admin shell consumes it.
#[derive(Debug, Serialize)]
pub struct AdminSessionView {
    #[serde(flatten)]
    pub status: AdminStatus,
    pub loading: bool,
    pub is_admin: bool,
    pub redirect_to: Option<&'static str>,
}

impl From<&AdminGuard> for AdminSessionView {
    fn from(guard: &AdminGuard) -> Self {
        Self {
            status: guard.status().clone(),
            loading: guard.is_loading(),
            is_admin: guard.is_admin(),
            redirect_to: guard.should_redirect().then_some(REDIRECT_PATH),
        }
    }
}

/// GET /api/v1/admin/session — resolve the admin guard for the caller.
pub async fn current(
    State(state): State<AppState>,
    MaybeSession { session, notice }: MaybeSession,
) -> Json<ApiResponse<AdminSessionView>> {
    let mut guard = AdminGuard::new();
    let notice = guard
        .resolve(state.store.as_ref(), session.as_ref().map(|s| &s.user))
        .await
        .or(notice);
    ApiResponse::with_notice(AdminSessionView::from(&guard), notice)
}

/// POST /api/v1/admin/sign-out — revoke the presented token.
pub async fn sign_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<ApiResponse<AdminSessionView>>, AppError> {
    let mut guard = AdminGuard::new();
    guard.resolve(state.store.as_ref(), Some(&session.user)).await;
    let notice = guard.sign_out(state.revocations.as_ref(), &session).await;
    Ok(ApiResponse::with_notice(AdminSessionView::from(&guard), notice))
}
