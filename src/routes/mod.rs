//! Route definitions for the admin API.

pub mod dashboard;
pub mod health;
pub mod session;
pub mod vendors;

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let origin = match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!(
                frontend_url = %state.config.frontend_url,
                "FRONTEND_URL is not a valid origin; allowing any origin"
            );
            AllowOrigin::any()
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    let admin_routes = Router::new()
        .route("/admin/session", get(session::current))
        .route("/admin/sign-out", post(session::sign_out))
        .route("/admin/dashboard", get(dashboard::overview))
        .route("/admin/vendors", get(vendors::list))
        .route("/admin/vendors/{id}/approve", post(vendors::approve))
        .route("/admin/vendors/{id}/revoke", post(vendors::revoke));

    let health_routes = Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready));

    Router::new()
        .nest("/api/v1", admin_routes.merge(health_routes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
