//! Vendor approval workflow: load applications, split them into tabs, and
//! approve or revoke vendors.

use serde::Serialize;
use uuid::Uuid;

use crate::db::{MarketplaceStore, ProfileSync};
use crate::models::notice::Notice;
use crate::models::vendor::{VendorRow, VendorWithOwner};

/// Vendors split by approval state. `all` is the unsplit (but searched) set.
#[derive(Debug)]
pub struct VendorTabs<'a> {
    pub pending: Vec<&'a VendorWithOwner>,
    pub approved: Vec<&'a VendorWithOwner>,
    pub all: Vec<&'a VendorWithOwner>,
}

/// Case-insensitive substring match on business name or owner email.
pub fn matches_search(v: &VendorWithOwner, search: &str) -> bool {
    let needle = search.to_lowercase();
    v.vendor.business_name.to_lowercase().contains(&needle)
        || v
            .owner_email()
            .is_some_and(|email| email.to_lowercase().contains(&needle))
}

/// Narrow `vendors` by `search`, then split into pending and approved.
pub fn partition<'a>(vendors: &'a [VendorWithOwner], search: &str) -> VendorTabs<'a> {
    let all: Vec<&VendorWithOwner> = vendors.iter().filter(|v| matches_search(v, search)).collect();
    let (approved, pending) = all.iter().copied().partition(|v| v.vendor.is_approved);

    VendorTabs {
        pending,
        approved,
        all,
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TabCounts {
    pub pending: usize,
    pub approved: usize,
    pub all: usize,
}

/// Serializable board: tab counts plus the rows of each tab.
#[derive(Debug, Clone, Serialize)]
pub struct VendorBoardView {
    pub loading: bool,
    pub search: String,
    pub counts: TabCounts,
    pub pending: Vec<VendorRow>,
    pub approved: Vec<VendorRow>,
    pub all: Vec<VendorRow>,
}

fn rows(list: &[&VendorWithOwner], with_action: bool) -> Vec<VendorRow> {
    list.iter().map(|v| VendorRow::build(v, with_action)).collect()
}

/// Result of an approve or revoke.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub vendor_id: Uuid,
    pub approved: bool,
    /// Whether the vendor flag write went through and the board was updated.
    pub applied: bool,
    pub profile: Option<ProfileSync>,
    #[serde(skip)]
    pub notice: Notice,
}

/// Loaded vendor applications, held locally between actions.
#[derive(Debug, Clone)]
pub struct VendorBoard {
    vendors: Vec<VendorWithOwner>,
    loading: bool,
}

impl Default for VendorBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorBoard {
    pub fn new() -> Self {
        Self {
            vendors: Vec::new(),
            loading: true,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetch every vendor, newest first. A failed fetch leaves the board empty
    /// and returns an error notice; loading always ends.
    pub async fn load(&mut self, store: &dyn MarketplaceStore) -> Option<Notice> {
        let notice = match store.list_vendors_with_owner().await {
            Ok(vendors) => {
                tracing::debug!(count = vendors.len(), "Vendors loaded");
                self.vendors = vendors;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching vendors");
                Some(Notice::error("Failed to fetch vendors"))
            }
        };
        self.loading = false;
        notice
    }

    pub fn partition(&self, search: &str) -> VendorTabs<'_> {
        partition(&self.vendors, search)
    }

    pub fn view(&self, search: &str) -> VendorBoardView {
        let tabs = self.partition(search);

        VendorBoardView {
            loading: self.loading,
            search: search.to_string(),
            counts: TabCounts {
                pending: tabs.pending.len(),
                approved: tabs.approved.len(),
                all: tabs.all.len(),
            },
            pending: rows(&tabs.pending, true),
            approved: rows(&tabs.approved, true),
            all: rows(&tabs.all, false),
        }
    }

    pub async fn approve(&mut self, store: &dyn MarketplaceStore, vendor_id: Uuid) -> ApprovalOutcome {
        self.set_approval(store, vendor_id, true).await
    }

    pub async fn revoke(&mut self, store: &dyn MarketplaceStore, vendor_id: Uuid) -> ApprovalOutcome {
        self.set_approval(store, vendor_id, false).await
    }

    async fn set_approval(
        &mut self,
        store: &dyn MarketplaceStore,
        vendor_id: Uuid,
        approved: bool,
    ) -> ApprovalOutcome {
        match store.apply_vendor_approval(vendor_id, approved).await {
            Ok(profile) => {
                // Optimistic: the board is updated without re-fetching, even if
                // the profile write diverged.
                for v in self.vendors.iter_mut().filter(|v| v.vendor.id == vendor_id) {
                    v.vendor.is_approved = approved;
                }
                tracing::info!(%vendor_id, approved, ?profile, "Vendor approval updated");

                ApprovalOutcome {
                    vendor_id,
                    approved,
                    applied: true,
                    profile: Some(profile),
                    notice: Notice::success(if approved {
                        "Vendor approved successfully"
                    } else {
                        "Vendor status revoked"
                    }),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, %vendor_id, approved, "Error updating vendor approval");
                ApprovalOutcome {
                    vendor_id,
                    approved,
                    applied: false,
                    profile: None,
                    notice: Notice::error(if approved {
                        "Failed to approve vendor"
                    } else {
                        "Failed to update vendor status"
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryOp, MemoryStore};
    use crate::models::profile::Profile;
    use crate::models::vendor::{OwnerContact, Vendor};
    use chrono::{Duration, Utc};

    fn listed(name: &str, email: Option<&str>, approved: bool) -> VendorWithOwner {
        let mut vendor = Vendor::new(Uuid::new_v4(), name);
        vendor.is_approved = approved;
        VendorWithOwner {
            vendor,
            owner: email.map(|e| OwnerContact {
                full_name: None,
                email: Some(e.to_string()),
                phone: None,
            }),
        }
    }

    fn approved_on(board: &VendorBoard, vendor_id: Uuid) -> bool {
        board
            .vendors
            .iter()
            .any(|v| v.vendor.id == vendor_id && v.vendor.is_approved)
    }

    /// Store with one pending vendor owned by a profile; returns (vendor, owner).
    fn seeded_store() -> (MemoryStore, Uuid, Uuid) {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut profile = Profile::new(owner);
        profile.email = Some("kiran@terracotta.in".to_string());
        store.insert_profile(profile);
        let vendor = Vendor::new(owner, "Terracotta Studio");
        let vendor_id = vendor.id;
        store.insert_vendor(vendor);
        (store, vendor_id, owner)
    }

    #[test]
    fn partition_is_a_total_disjoint_split() {
        let vendors = vec![
            listed("Alpha Spices", Some("a@x.in"), false),
            listed("Beta Looms", Some("b@x.in"), true),
            listed("Gamma Pottery", None, false),
            listed("Delta Brass", Some("d@x.in"), true),
        ];
        let tabs = partition(&vendors, "");

        assert_eq!(tabs.all.len(), vendors.len());
        assert_eq!(tabs.pending.len() + tabs.approved.len(), tabs.all.len());
        for v in &vendors {
            let in_pending = tabs.pending.iter().any(|p| p.vendor.id == v.vendor.id);
            let in_approved = tabs.approved.iter().any(|p| p.vendor.id == v.vendor.id);
            assert!(in_pending != in_approved);
            assert_eq!(in_approved, v.vendor.is_approved);
        }
    }

    #[test]
    fn search_is_case_insensitive_on_name_or_email() {
        let vendors = vec![
            listed("Alpha Spices", Some("owner@alpha.in"), false),
            listed("Beta Looms", Some("SALES@LOOMS.IN"), true),
            listed("Gamma Pottery", None, false),
        ];

        let tabs = partition(&vendors, "SPICE");
        assert_eq!(tabs.all.len(), 1);
        assert_eq!(tabs.pending.len(), 1);
        assert_eq!(tabs.approved.len(), 0);

        let tabs = partition(&vendors, "looms.in");
        assert_eq!(tabs.all.len(), 1);
        assert_eq!(tabs.approved.len(), 1);

        let tabs = partition(&vendors, "zzz");
        assert!(tabs.all.is_empty() && tabs.pending.is_empty() && tabs.approved.is_empty());
    }

    #[tokio::test]
    async fn empty_fetch_gives_zero_counts_and_no_notice() {
        let store = MemoryStore::new();
        let mut board = VendorBoard::new();
        assert!(board.is_loading());

        assert!(board.load(&store).await.is_none());
        assert!(!board.is_loading());
        let view = board.view("");
        assert_eq!(view.counts, TabCounts { pending: 0, approved: 0, all: 0 });
    }

    #[tokio::test]
    async fn failed_fetch_ends_loading_with_error_notice() {
        let (store, _, _) = seeded_store();
        store.fail(MemoryOp::ListVendors);

        let mut board = VendorBoard::new();
        let notice = board.load(&store).await.unwrap();
        assert_eq!(notice.description, "Failed to fetch vendors");
        assert!(!board.is_loading());
        assert!(board.vendors.is_empty());
    }

    #[tokio::test]
    async fn approve_sets_vendor_and_profile_flags() {
        let (store, vendor_id, owner) = seeded_store();
        let mut board = VendorBoard::new();
        board.load(&store).await;

        let outcome = board.approve(&store, vendor_id).await;
        assert!(outcome.applied);
        assert_eq!(outcome.profile, Some(ProfileSync::Synced));
        assert_eq!(outcome.notice.description, "Vendor approved successfully");
        assert!(approved_on(&board, vendor_id));
        assert!(store.vendor(vendor_id).unwrap().is_approved);
        assert!(store.profile(owner).unwrap().is_vendor.unwrap_or(false));
        assert_eq!(board.view("").counts.approved, 1);
    }

    #[tokio::test]
    async fn approve_then_revoke_restores_original_flags() {
        let (store, vendor_id, owner) = seeded_store();
        let mut board = VendorBoard::new();
        board.load(&store).await;

        board.approve(&store, vendor_id).await;
        let outcome = board.revoke(&store, vendor_id).await;
        assert_eq!(outcome.notice.description, "Vendor status revoked");

        assert!(!approved_on(&board, vendor_id));
        assert!(!store.vendor(vendor_id).unwrap().is_approved);
        assert!(!store.profile(owner).unwrap().is_vendor.unwrap_or(false));
    }

    #[tokio::test]
    async fn vendor_write_failure_leaves_board_untouched() {
        let (store, vendor_id, owner) = seeded_store();
        let mut board = VendorBoard::new();
        board.load(&store).await;
        store.fail(MemoryOp::SetVendorApproved);

        let outcome = board.approve(&store, vendor_id).await;
        assert!(!outcome.applied);
        assert_eq!(outcome.notice.description, "Failed to approve vendor");
        assert!(!approved_on(&board, vendor_id));
        assert!(!store.profile(owner).unwrap().is_vendor.unwrap_or(false));

        let outcome = board.revoke(&store, vendor_id).await;
        assert_eq!(outcome.notice.description, "Failed to update vendor status");
    }

    /// Two independent writes: vendor approved, profile write fails. The board
    /// shows approved while the owner's profile still says not-a-vendor, and
    /// nothing reconciles the two.
    #[tokio::test]
    async fn profile_write_failure_leaves_records_diverged() {
        let (store, vendor_id, owner) = seeded_store();
        let mut board = VendorBoard::new();
        board.load(&store).await;
        store.fail(MemoryOp::SetProfileVendor);

        let outcome = board.approve(&store, vendor_id).await;
        assert!(outcome.applied);
        assert_eq!(outcome.profile, Some(ProfileSync::Diverged));
        assert!(!outcome.notice.is_error());

        assert!(approved_on(&board, vendor_id));
        assert!(store.vendor(vendor_id).unwrap().is_approved);
        assert!(!store.profile(owner).unwrap().is_vendor.unwrap_or(false));

        // Reloading shows the vendor approved; the profile stays behind.
        store.recover(MemoryOp::SetProfileVendor);
        let mut reloaded = VendorBoard::new();
        reloaded.load(&store).await;
        assert!(approved_on(&reloaded, vendor_id));
        assert!(!store.profile(owner).unwrap().is_vendor.unwrap_or(false));
    }

    #[tokio::test]
    async fn vendor_missing_from_board_still_syncs_owner_profile() {
        let (store, vendor_id, owner) = seeded_store();
        store.fail(MemoryOp::ListVendors);
        let mut board = VendorBoard::new();
        assert!(board.load(&store).await.is_some());

        let outcome = board.approve(&store, vendor_id).await;
        assert!(outcome.applied);
        assert_eq!(outcome.profile, Some(ProfileSync::Synced));
        assert!(store.vendor(vendor_id).unwrap().is_approved);
        assert!(store.profile(owner).unwrap().is_vendor.unwrap_or(false));
    }

    #[tokio::test]
    async fn view_rows_follow_newest_first_order() {
        let store = MemoryStore::new();
        let mut old = Vendor::new(Uuid::new_v4(), "Old Mill");
        old.created_at = Some(Utc::now() - Duration::days(10));
        store.insert_vendor(old);
        store.insert_vendor(Vendor::new(Uuid::new_v4(), "New Forge"));

        let mut board = VendorBoard::new();
        board.load(&store).await;
        let view = board.view("");
        assert_eq!(view.all[0].business_name, "New Forge");
        assert!(view.all.iter().all(|r| r.action.is_none()));
        assert!(view.pending.iter().all(|r| r.action.is_some()));
    }
}
