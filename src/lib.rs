pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use db::MarketplaceStore;
use services::session::SessionRevocations;

/// Shared application state passed to all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MarketplaceStore>,
    pub revocations: Arc<dyn SessionRevocations>,
    pub config: config::AppConfig,
}
