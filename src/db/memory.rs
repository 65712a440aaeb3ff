//! In-process marketplace store with per-operation failure injection.
//!
//! Keeps the two-write approval of the trait default, so a failed profile
//! write after a successful vendor write leaves the rows diverged exactly as
//! the hosted backend would.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{CountQuery, MarketplaceStore};
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::models::vendor::{OwnerContact, Vendor, VendorWithOwner};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    Ping,
    FindAdminProfile,
    ListVendors,
    SetVendorApproved,
    SetProfileVendor,
    Count(CountQuery),
    OrderTotals,
}

#[derive(Debug, Clone)]
struct OrderRow {
    total_amount: Option<Decimal>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: Vec<Profile>,
    vendors: Vec<Vendor>,
    products: i64,
    orders: Vec<OrderRow>,
    failing: HashSet<MemoryOp>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }

    /// Lock the tables, failing first if `op` has been made to fail.
    fn enter(&self, op: MemoryOp) -> Result<MutexGuard<'_, Tables>, AppError> {
        let tables = self.tables()?;
        if tables.failing.contains(&op) {
            return Err(AppError::Internal(format!("{op:?} failed")));
        }
        Ok(tables)
    }

    pub fn insert_profile(&self, profile: Profile) {
        if let Ok(mut t) = self.tables() {
            t.profiles.push(profile);
        }
    }

    pub fn insert_vendor(&self, vendor: Vendor) {
        if let Ok(mut t) = self.tables() {
            t.vendors.push(vendor);
        }
    }

    pub fn insert_products(&self, count: i64) {
        if let Ok(mut t) = self.tables() {
            t.products += count;
        }
    }

    pub fn insert_order(&self, total_amount: Option<Decimal>, created_at: DateTime<Utc>) {
        if let Ok(mut t) = self.tables() {
            t.orders.push(OrderRow {
                total_amount,
                created_at,
            });
        }
    }

    /// Make every later call of `op` fail until [`MemoryStore::recover`].
    pub fn fail(&self, op: MemoryOp) {
        if let Ok(mut t) = self.tables() {
            t.failing.insert(op);
        }
    }

    pub fn recover(&self, op: MemoryOp) {
        if let Ok(mut t) = self.tables() {
            t.failing.remove(&op);
        }
    }

    pub fn profile(&self, user_id: Uuid) -> Option<Profile> {
        self.tables()
            .ok()?
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
    }

    pub fn vendor(&self, vendor_id: Uuid) -> Option<Vendor> {
        self.tables()
            .ok()?
            .vendors
            .iter()
            .find(|v| v.id == vendor_id)
            .cloned()
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.enter(MemoryOp::Ping)?;
        Ok(())
    }

    async fn find_admin_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let t = self.enter(MemoryOp::FindAdminProfile)?;
        let profile = t
            .profiles
            .iter()
            .find(|p| p.user_id == user_id && p.is_admin())
            .cloned();
        Ok(profile)
    }

    async fn list_vendors_with_owner(&self) -> Result<Vec<VendorWithOwner>, AppError> {
        let t = self.enter(MemoryOp::ListVendors)?;

        let mut vendors: Vec<VendorWithOwner> = t
            .vendors
            .iter()
            .map(|v| VendorWithOwner {
                vendor: v.clone(),
                owner: t
                    .profiles
                    .iter()
                    .find(|p| p.user_id == v.user_id)
                    .map(|p| OwnerContact {
                        full_name: p.full_name.clone(),
                        email: p.email.clone(),
                        phone: p.phone.clone(),
                    }),
            })
            .collect();

        // Newest first, undated rows ahead of dated ones as Postgres sorts
        // nulls in a descending order.
        let key = |v: &VendorWithOwner| (v.vendor.created_at.is_none(), v.vendor.created_at);
        vendors.sort_by(|a, b| key(b).cmp(&key(a)));
        Ok(vendors)
    }

    async fn set_vendor_approved(&self, vendor_id: Uuid, approved: bool) -> Result<Uuid, AppError> {
        let mut t = self.enter(MemoryOp::SetVendorApproved)?;
        let vendor = t
            .vendors
            .iter_mut()
            .find(|v| v.id == vendor_id)
            .ok_or_else(|| AppError::NotFound(format!("Vendor {vendor_id}")))?;
        vendor.is_approved = approved;
        Ok(vendor.user_id)
    }

    async fn set_profile_vendor(&self, user_id: Uuid, is_vendor: bool) -> Result<(), AppError> {
        let mut t = self.enter(MemoryOp::SetProfileVendor)?;
        for profile in t.profiles.iter_mut().filter(|p| p.user_id == user_id) {
            profile.is_vendor = Some(is_vendor);
            profile.updated_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn count(&self, query: CountQuery) -> Result<i64, AppError> {
        let t = self.enter(MemoryOp::Count(query))?;
        let n = match query {
            CountQuery::Profiles => t.profiles.len(),
            CountQuery::Vendors => t.vendors.len(),
            CountQuery::Products => return Ok(t.products),
            CountQuery::Orders => t.orders.len(),
            CountQuery::PendingVendors => t.vendors.iter().filter(|v| !v.is_approved).count(),
        };
        i64::try_from(n).map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn order_totals_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<Option<Decimal>>, AppError> {
        let t = self.enter(MemoryOp::OrderTotals)?;
        let totals = t
            .orders
            .iter()
            .filter(|o| o.created_at >= since)
            .map(|o| o.total_amount)
            .collect();
        Ok(totals)
    }
}
