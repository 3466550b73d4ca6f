/// Authentication and authorization utilities
///
/// This module provides the authentication primitives for OpsDesk:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation (HS256)
/// - [`middleware`]: Cookie-based session middleware for Axum
///
/// # Session Model
///
/// OpsDesk runs two independent session namespaces so an admin session and
/// a staff session can coexist in the same browser:
///
/// - Admin sessions live in the `adminToken` cookie
/// - Staff sessions live in the `userToken` cookie
///
/// Both hold a signed token with a fixed 24-hour lifetime and no refresh;
/// expiry forces re-login.

pub mod jwt;
pub mod middleware;
pub mod password;
