//! Vendor applications, their owning profile's contact projection, and the
//! table rows shown on the vendor board.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Characters of the business description shown in a table row.
const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// A vendor application. `is_approved` is false while pending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub business_description: Option<String>,
    pub business_address: Option<serde_json::Value>,
    pub tax_id: Option<String>,
    pub is_approved: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Vendor {
    /// A pending application for `user_id`.
    pub fn new(user_id: Uuid, business_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            business_name: business_name.into(),
            business_description: None,
            business_address: None,
            tax_id: None,
            is_approved: false,
            created_at: Some(Utc::now()),
        }
    }
}

/// The subset of the owning profile joined onto each vendor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnerContact {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Vendor joined with its owner's contact fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorWithOwner {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub owner: Option<OwnerContact>,
}

impl VendorWithOwner {
    pub fn owner_email(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.email.as_deref())
    }
}

/// Flat row produced by the vendors ⟕ profiles query.
#[derive(Debug, FromRow)]
pub struct VendorOwnerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub business_name: String,
    pub business_description: Option<String>,
    pub business_address: Option<serde_json::Value>,
    pub tax_id: Option<String>,
    pub is_approved: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub owner_found: bool,
    pub owner_full_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

impl From<VendorOwnerRow> for VendorWithOwner {
    fn from(row: VendorOwnerRow) -> Self {
        let owner = row.owner_found.then(|| OwnerContact {
            full_name: row.owner_full_name,
            email: row.owner_email,
            phone: row.owner_phone,
        });

        Self {
            vendor: Vendor {
                id: row.id,
                user_id: row.user_id,
                business_name: row.business_name,
                business_description: row.business_description,
                business_address: row.business_address,
                tax_id: row.tax_id,
                // Unset approval reads as pending.
                is_approved: row.is_approved.unwrap_or(false),
                created_at: row.created_at,
            },
            owner,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VendorAction {
    Approve,
    Revoke,
}

/// One rendered line of a vendor table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VendorRow {
    pub id: Uuid,
    pub business_name: String,
    pub description_preview: String,
    pub owner_name: String,
    pub owner_email: Option<String>,
    pub status: &'static str,
    pub applied_on: Option<NaiveDate>,
    pub action: Option<VendorAction>,
}

impl VendorRow {
    pub fn build(v: &VendorWithOwner, with_action: bool) -> Self {
        let description: String = v
            .vendor
            .business_description
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(DESCRIPTION_PREVIEW_CHARS)
            .collect();

        let action = with_action.then_some(if v.vendor.is_approved {
            VendorAction::Revoke
        } else {
            VendorAction::Approve
        });

        Self {
            id: v.vendor.id,
            business_name: v.vendor.business_name.clone(),
            description_preview: format!("{description}..."),
            owner_name: v
                .owner
                .as_ref()
                .and_then(|o| o.full_name.clone())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            owner_email: v.owner_email().map(str::to_string),
            status: if v.vendor.is_approved { "Approved" } else { "Pending" },
            applied_on: v.vendor.created_at.map(|t| t.date_naive()),
            action,
        }
    }
}
