//! Bearer session extractors for Axum handlers.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;
use crate::models::notice::Notice;
use crate::services::session::{self, Session};
use crate::AppState;

/// Session extracted from a valid, non-revoked bearer token.
///
/// Use as an Axum extractor in handlers that require a signed-in caller:
/// ```ignore
/// async fn handler(CurrentSession(session): CurrentSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await?
            .map(CurrentSession)
            .ok_or(AppError::Unauthorized)
    }
}

/// Session if the caller presented a usable token; `None` otherwise.
///
/// Never rejects: when the sign-out blocklist cannot be checked the caller is
/// treated as having no session and `notice` says why.
#[derive(Debug, Clone)]
pub struct MaybeSession {
    pub session: Option<Session>,
    pub notice: Option<Notice>,
}

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await {
            Ok(session) => Ok(MaybeSession {
                session,
                notice: None,
            }),
            Err(e) => {
                tracing::error!(error = %e, "Session blocklist lookup failed");
                Ok(MaybeSession {
                    session: None,
                    notice: Some(Notice::error("Failed to verify admin status")),
                })
            }
        }
    }
}

/// Missing, malformed, invalid and signed-out tokens all mean "no session".
/// Only a failing blocklist lookup is an error.
async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Option<Session>, AppError> {
    let Some(token) = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return Ok(None);
    };

    let session = match session::validate_token(
        token,
        &state.config.jwt_secret,
        &state.config.jwt_audience,
    ) {
        Ok(session) => session,
        Err(_) => {
            tracing::debug!("Rejected bearer token");
            return Ok(None);
        }
    };

    if state.revocations.is_revoked(&session.fingerprint()).await? {
        tracing::debug!(user_id = %session.user.id, "Token was signed out");
        return Ok(None);
    }

    Ok(Some(session))
}
