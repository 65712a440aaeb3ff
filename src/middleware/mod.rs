//! Request extractors for session resolution and admin gating.

pub mod auth;
pub mod rbac;
