//! Dashboard statistics aggregation queries.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{CountQuery, MarketplaceStore};
use crate::errors::AppError;

/// Marketplace-wide counters for the admin overview page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_vendors: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_vendors: i64,
    /// Sum of order totals inside the revenue window.
    pub recent_revenue: Decimal,
}

/// One tile on the overview page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub description: &'static str,
}

/// Stats plus the rendered cards. `stats` is `None` when any query failed.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub stats: Option<DashboardStats>,
    pub cards: Vec<StatCard>,
}

/// Sum order totals; a missing total counts as zero.
pub fn sum_revenue(totals: &[Option<Decimal>]) -> Decimal {
    totals.iter().flatten().copied().sum()
}

/// Start of a `window_days` revenue window ending at `now`. The window must be
/// positive and representable.
fn window_start(now: DateTime<Utc>, window_days: i64) -> Result<DateTime<Utc>, AppError> {
    Some(window_days)
        .filter(|days| *days > 0)
        .and_then(Duration::try_days)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            AppError::Validation(format!("revenue window of {window_days} days is out of range"))
        })
}

/// Fetch all six counters concurrently. Any failure fails the whole set.
pub async fn get_stats(
    store: &dyn MarketplaceStore,
    now: DateTime<Utc>,
    window_days: i64,
) -> Result<DashboardStats, AppError> {
    let since = window_start(now, window_days)?;

    let (total_users, total_vendors, total_products, total_orders, pending_vendors, recent_totals) = tokio::try_join!(
        store.count(CountQuery::Profiles),
        store.count(CountQuery::Vendors),
        store.count(CountQuery::Products),
        store.count(CountQuery::Orders),
        store.count(CountQuery::PendingVendors),
        store.order_totals_since(since),
    )?;

    Ok(DashboardStats {
        total_users,
        total_vendors,
        total_products,
        total_orders,
        pending_vendors,
        recent_revenue: sum_revenue(&recent_totals),
    })
}

/// Load the overview. Failures are logged and leave `stats` unpopulated; the
/// cards then show zeros.
pub async fn overview(
    store: &dyn MarketplaceStore,
    now: DateTime<Utc>,
    window_days: i64,
    currency: &str,
) -> DashboardOverview {
    let stats = match get_stats(store, now, window_days).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::error!(error = %e, "Error fetching dashboard stats");
            None
        }
    };

    DashboardOverview {
        cards: stat_cards(stats.as_ref(), window_days, currency),
        stats,
    }
}

pub fn stat_cards(stats: Option<&DashboardStats>, window_days: i64, currency: &str) -> Vec<StatCard> {
    let count = |f: fn(&DashboardStats) -> i64| stats.map(f).unwrap_or(0).to_string();
    let revenue = stats.map(|s| s.recent_revenue).unwrap_or_default();

    vec![
        StatCard {
            title: "Total Users",
            value: count(|s| s.total_users),
            description: "Registered customers",
        },
        StatCard {
            title: "Total Vendors",
            value: count(|s| s.total_vendors),
            description: "Active vendors",
        },
        StatCard {
            title: "Total Products",
            value: count(|s| s.total_products),
            description: "Listed products",
        },
        StatCard {
            title: "Total Orders",
            value: count(|s| s.total_orders),
            description: "Orders placed",
        },
        StatCard {
            title: "Pending Vendors",
            value: count(|s| s.pending_vendors),
            description: "Awaiting approval",
        },
        StatCard {
            title: revenue_title(window_days),
            value: format!("{currency}{:.2}", revenue.round_dp(2)),
            description: revenue_description(window_days),
        },
    ]
}

fn revenue_title(window_days: i64) -> &'static str {
    match window_days {
        7 => "7-Day Revenue",
        30 => "30-Day Revenue",
        90 => "90-Day Revenue",
        _ => "Recent Revenue",
    }
}

fn revenue_description(window_days: i64) -> &'static str {
    match window_days {
        7 => "Last 7 days",
        30 => "Last 30 days",
        90 => "Last 90 days",
        _ => "Revenue window",
    }
}
