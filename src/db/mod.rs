//! Database connection pool and the marketplace store boundary.
//!
//! The marketplace schema is owned by the hosted backend; this crate only reads
//! and writes through it. [`MarketplaceStore`] is the seam every service goes
//! through, with [`PgStore`] for Postgres and [`MemoryStore`] for tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::vendor::VendorWithOwner;

pub use memory::{MemoryOp, MemoryStore};
pub use postgres::PgStore;

/// Create a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Row counts the dashboard asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountQuery {
    Profiles,
    Vendors,
    Products,
    Orders,
    PendingVendors,
}

impl CountQuery {
    pub fn sql(self) -> &'static str {
        match self {
            Self::Profiles => "SELECT COUNT(*) FROM profiles",
            Self::Vendors => "SELECT COUNT(*) FROM vendors",
            Self::Products => "SELECT COUNT(*) FROM products",
            Self::Orders => "SELECT COUNT(*) FROM orders",
            Self::PendingVendors => {
                "SELECT COUNT(*) FROM vendors WHERE COALESCE(is_approved, false) = false"
            }
        }
    }
}

/// What happened to the owner's profile flag during an approval change.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSync {
    /// Vendor flag and profile flag were both written.
    Synced,
    /// The vendor flag was written but the profile write failed.
    Diverged,
}

/// Table-scoped reads and writes against the marketplace backend.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Round-trip check used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;

    /// Profile for `user_id` with the admin flag set, if any.
    async fn find_admin_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError>;

    /// All vendors with their owner's contact fields, newest first.
    async fn list_vendors_with_owner(&self) -> Result<Vec<VendorWithOwner>, AppError>;

    /// Set a vendor's approval flag and return the owning user id. `NotFound`
    /// when no such vendor exists.
    async fn set_vendor_approved(&self, vendor_id: Uuid, approved: bool) -> Result<Uuid, AppError>;

    /// Set the vendor flag on the profile owned by `user_id`.
    async fn set_profile_vendor(&self, user_id: Uuid, is_vendor: bool) -> Result<(), AppError>;

    /// Move a vendor's approval flag and its owner's vendor flag together. The
    /// owner is the one recorded on the vendor row.
    ///
    /// The default runs two independent writes: a failed profile write after
    /// a successful vendor write is reported as [`ProfileSync::Diverged`], not
    /// rolled back. Stores that can do better override this.
    async fn apply_vendor_approval(
        &self,
        vendor_id: Uuid,
        approved: bool,
    ) -> Result<ProfileSync, AppError> {
        let user_id = self.set_vendor_approved(vendor_id, approved).await?;

        match self.set_profile_vendor(user_id, approved).await {
            Ok(()) => Ok(ProfileSync::Synced),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    %vendor_id,
                    %user_id,
                    approved,
                    "Vendor flag written but profile flag was not; records have diverged"
                );
                Ok(ProfileSync::Diverged)
            }
        }
    }

    async fn count(&self, query: CountQuery) -> Result<i64, AppError>;

    /// `total_amount` of every order created at or after `since`.
    async fn order_totals_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Option<Decimal>>, AppError>;
}
