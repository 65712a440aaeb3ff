//! Postgres-backed marketplace store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CountQuery, MarketplaceStore, ProfileSync};
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::vendor::{VendorOwnerRow, VendorWithOwner};

const SET_VENDOR_APPROVED: &str =
    "UPDATE vendors SET is_approved = $2, updated_at = NOW() WHERE id = $1 RETURNING user_id";

const SET_PROFILE_VENDOR: &str =
    "UPDATE profiles SET is_vendor = $2, updated_at = NOW() WHERE user_id = $1";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MarketplaceStore for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_admin_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = $1 AND is_admin = true LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn list_vendors_with_owner(&self) -> Result<Vec<VendorWithOwner>, AppError> {
        let rows = sqlx::query_as::<_, VendorOwnerRow>(
            r#"
            SELECT
                v.id, v.user_id, v.business_name, v.business_description,
                v.business_address, v.tax_id, v.is_approved, v.created_at,
                (p.id IS NOT NULL) AS owner_found,
                p.full_name AS owner_full_name,
                p.email     AS owner_email,
                p.phone     AS owner_phone
            FROM vendors v
            LEFT JOIN profiles p ON p.user_id = v.user_id
            ORDER BY v.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VendorWithOwner::from).collect())
    }

    async fn set_vendor_approved(&self, vendor_id: Uuid, approved: bool) -> Result<Uuid, AppError> {
        sqlx::query_scalar::<_, Uuid>(SET_VENDOR_APPROVED)
            .bind(vendor_id)
            .bind(approved)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vendor {vendor_id}")))
    }

    async fn set_profile_vendor(&self, user_id: Uuid, is_vendor: bool) -> Result<(), AppError> {
        sqlx::query(SET_PROFILE_VENDOR)
            .bind(user_id)
            .bind(is_vendor)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Both flag writes commit or neither does.
    async fn apply_vendor_approval(
        &self,
        vendor_id: Uuid,
        approved: bool,
    ) -> Result<ProfileSync, AppError> {
        let mut tx = self.pool.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(SET_VENDOR_APPROVED)
            .bind(vendor_id)
            .bind(approved)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vendor {vendor_id}")))?;

        sqlx::query(SET_PROFILE_VENDOR)
            .bind(user_id)
            .bind(approved)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(ProfileSync::Synced)
    }

    async fn count(&self, query: CountQuery) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(query.sql())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn order_totals_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Option<Decimal>>, AppError> {
        let totals = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT total_amount FROM orders WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }
}
