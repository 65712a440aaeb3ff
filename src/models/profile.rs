//! Per-user profile record and the admin identity derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row from the `profiles` table. One profile per authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub address: Option<serde_json::Value>,
    pub is_admin: Option<bool>,
    pub is_vendor: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// A bare profile for `user_id` with every optional column empty.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            email: None,
            full_name: None,
            phone: None,
            avatar_url: None,
            address: None,
            is_admin: Some(false),
            is_vendor: Some(false),
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

/// Identity of a verified administrator, exposed to the admin console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminIdentity {
    /// The auth user id, not the profile row id.
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

impl From<&Profile> for AdminIdentity {
    fn from(p: &Profile) -> Self {
        Self {
            id: p.user_id,
            email: p.email.clone().unwrap_or_default(),
            full_name: p.full_name.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_identity_defaults_missing_contact_to_empty() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.is_admin = Some(true);
        let identity = AdminIdentity::from(&profile);
        assert_eq!(identity.id, profile.user_id);
        assert_eq!(identity.email, "");
        assert_eq!(identity.full_name, "");
    }

    #[test]
    fn null_admin_flag_reads_as_false() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.is_admin = None;
        assert!(!profile.is_admin());
    }
}
