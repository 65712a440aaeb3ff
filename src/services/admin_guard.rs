//! Admin session guard: decides whether the current actor may use the admin
//! console.
//!
//! The guard starts [`AdminStatus::Unresolved`] and settles exactly once per
//! [`AdminGuard::resolve`]. Consumers show a loading state while unresolved and
//! redirect away once it settles on anything but `Authorized`.

use serde::Serialize;

use crate::db::MarketplaceStore;
use crate::models::notice::Notice;
use crate::models::profile::AdminIdentity;
use crate::services::session::{Session, SessionRevocations, SessionUser};

/// Where non-admins are sent once the guard settles.
pub const REDIRECT_PATH: &str = "/";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", content = "admin", rename_all = "snake_case")]
pub enum AdminStatus {
    Unresolved,
    Authorized(AdminIdentity),
    Unauthorized,
}

#[derive(Debug, Clone)]
pub struct AdminGuard {
    status: AdminStatus,
}

impl Default for AdminGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminGuard {
    pub fn new() -> Self {
        Self {
            status: AdminStatus::Unresolved,
        }
    }

    pub fn status(&self) -> &AdminStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == AdminStatus::Unresolved
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.status, AdminStatus::Authorized(_))
    }

    pub fn admin(&self) -> Option<&AdminIdentity> {
        match &self.status {
            AdminStatus::Authorized(identity) => Some(identity),
            _ => None,
        }
    }

    /// True once resolved to anything but an authorized admin.
    pub fn should_redirect(&self) -> bool {
        !self.is_loading() && !self.is_admin()
    }

    /// Resolve the guard for `user`. No user, no admin profile, or a failed
    /// lookup all settle as `Unauthorized`; only the failure carries a notice.
    pub async fn resolve(
        &mut self,
        store: &dyn MarketplaceStore,
        user: Option<&SessionUser>,
    ) -> Option<Notice> {
        let Some(user) = user else {
            self.status = AdminStatus::Unauthorized;
            return None;
        };

        match store.find_admin_profile(user.id).await {
            Ok(Some(profile)) if profile.is_admin() => {
                tracing::debug!(user_id = %user.id, "Admin session verified");
                self.status = AdminStatus::Authorized(AdminIdentity::from(&profile));
                None
            }
            Ok(_) => {
                self.status = AdminStatus::Unauthorized;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %user.id, "Error checking admin status");
                self.status = AdminStatus::Unauthorized;
                Some(Notice::error("Failed to verify admin status"))
            }
        }
    }

    /// Revoke `session` and clear the admin identity. On failure the status is
    /// left as it was and an error notice is returned.
    pub async fn sign_out(
        &mut self,
        revocations: &dyn SessionRevocations,
        session: &Session,
    ) -> Option<Notice> {
        match revocations
            .revoke(&session.fingerprint(), session.remaining_secs())
            .await
        {
            Ok(()) => {
                tracing::info!(user_id = %session.user.id, "Signed out");
                self.status = AdminStatus::Unauthorized;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %session.user.id, "Sign-out failed");
                Some(Notice::error("Failed to sign out"))
            }
        }
    }
}
