//! Database models and DTOs for the admin console's entities.

pub mod notice;
pub mod profile;
pub mod vendor;
