/// HTTP middleware for the API server
///
/// Session authentication middleware lives in `opsdesk_shared::auth`;
/// this module holds middleware that is purely an HTTP concern.
///
/// # Modules
///
/// - `security`: Security response headers

pub mod security;
