//! # OpsDesk Shared Library
//!
//! This crate contains shared types, utilities, and business logic used by
//! the OpsDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models, CRUD operations, and per-entity listing queries
//! - `auth`: Session tokens, password hashing, and the cookie auth middleware
//! - `listing`: Pagination and filter primitives shared by all listings
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod db;
pub mod listing;
pub mod models;

/// Current version of the OpsDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
