//! Admin gating extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::MaybeSession;
use crate::models::profile::AdminIdentity;
use crate::services::admin_guard::AdminGuard;
use crate::AppState;

/// Extractor that runs the admin guard and requires it to authorize.
///
/// No session rejects with 401; a session that resolves as not admin, including
/// a failed profile or blocklist lookup, rejects with 403.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminIdentity);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession { session, notice } =
            MaybeSession::from_request_parts(parts, state).await?;
        let Some(session) = session else {
            return Err(match notice {
                Some(_) => AppError::Forbidden("Admin access required".to_string()),
                None => AppError::Unauthorized,
            });
        };

        let mut guard = AdminGuard::new();
        guard.resolve(state.store.as_ref(), Some(&session.user)).await;

        guard
            .admin()
            .cloned()
            .map(RequireAdmin)
            .ok_or_else(|| AppError::Forbidden("Admin access required".to_string()))
    }
}
