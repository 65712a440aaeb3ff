//! Business logic services.

pub mod admin_guard;
pub mod dashboard;
pub mod session;
pub mod vendors;
