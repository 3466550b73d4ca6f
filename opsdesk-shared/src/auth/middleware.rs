/// Cookie session middleware for Axum
///
/// Protected routes are guarded by a middleware layer that reads the session
/// cookie for its namespace, validates the token, loads the user from the
/// database, and adds the authenticated user to request extensions.
///
/// # Request Extensions
///
/// After successful authentication, middleware adds:
/// - `CurrentUser`: id, name, email, role, and active flag of the caller
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use opsdesk_shared::auth::middleware::{require_admin_session, CurrentUser};
/// use sqlx::PgPool;
///
/// async fn handler(Extension(user): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.name)
/// }
///
/// fn admin_routes(pool: PgPool, secret: String) -> Router {
///     Router::new()
///         .route("/api/admin/clients", get(handler))
///         .layer(middleware::from_fn(require_admin_session(pool, secret)))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError, SessionAudience};

/// Authenticated user context added to request extensions
///
/// Loaded fresh from the database on every request, so deactivating a user
/// takes effect immediately even if their token is still valid.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Role ("admin" or "staff")
    pub role: String,

    /// Whether the account is active
    pub is_active: bool,
}

impl CurrentUser {
    /// Checks if this user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Error type for session authentication
#[derive(Debug)]
pub enum AuthError {
    /// Session cookie is missing
    MissingToken,

    /// Session token has expired
    TokenExpired,

    /// Session token failed validation
    InvalidToken(String),

    /// Token subject no longer exists
    UserNotFound,

    /// Account has been deactivated
    AccountInactive,

    /// Caller does not hold the required role
    RoleDenied,

    /// Database error during user lookup
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Session expired".to_string()),
            AuthError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "Invalid session".to_string())
            }
            AuthError::UserNotFound => (StatusCode::UNAUTHORIZED, "Invalid session".to_string()),
            AuthError::AccountInactive => {
                (StatusCode::FORBIDDEN, "Account is deactivated".to_string())
            }
            AuthError::RoleDenied => (StatusCode::FORBIDDEN, "Access denied".to_string()),
            AuthError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Extracts a named cookie value from the Cookie header
fn extract_cookie<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    let cookie_header = req.headers().get(header::COOKIE)?.to_str().ok()?;

    cookie_header
        .split(';')
        .map(|c| c.trim())
        .find_map(|c| c.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
}

/// Session authentication middleware
///
/// Reads the cookie for the given session namespace, validates the token
/// against that namespace, and loads the user. Admin-namespace sessions
/// additionally require the admin role; a staff user presenting a forged
/// admin-audience token would be caught here.
///
/// # Errors
///
/// Returns 401 Unauthorized if the cookie is missing, the token is invalid
/// or expired, or the user no longer exists. Returns 403 Forbidden for
/// deactivated accounts and role mismatches.
pub async fn session_auth_middleware(
    pool: PgPool,
    secret: String,
    audience: SessionAudience,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_cookie(&req, audience.cookie_name())
        .ok_or(AuthError::MissingToken)?
        .to_string();

    let claims = validate_token(&token, &secret, audience).map_err(|e| match e {
        JwtError::Expired => AuthError::TokenExpired,
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    let user = sqlx::query_as::<_, CurrentUser>(
        "SELECT id, name, email, role, is_active FROM users WHERE id = $1",
    )
    .bind(claims.sub)
    .fetch_optional(&pool)
    .await
    .map_err(|e| AuthError::DatabaseError(e.to_string()))?
    .ok_or(AuthError::UserNotFound)?;

    if !user.is_active {
        return Err(AuthError::AccountInactive);
    }

    if audience == SessionAudience::Admin && !user.is_admin() {
        return Err(AuthError::RoleDenied);
    }

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

type MiddlewareFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>;

/// Creates an admin session middleware closure
///
/// Captures the pool and secret and guards routes with the `adminToken`
/// cookie namespace.
pub fn require_admin_session(
    pool: PgPool,
    secret: String,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(session_auth_middleware(
            pool,
            secret,
            SessionAudience::Admin,
            req,
            next,
        ))
    }
}

/// Creates a staff session middleware closure
///
/// Captures the pool and secret and guards routes with the `userToken`
/// cookie namespace.
pub fn require_staff_session(
    pool: PgPool,
    secret: String,
) -> impl Fn(Request, Next) -> MiddlewareFuture + Clone {
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(session_auth_middleware(
            pool,
            secret,
            SessionAudience::Staff,
            req,
            next,
        ))
    }
}

/// Builds the Set-Cookie value that establishes a session
///
/// The cookie is HttpOnly with a Max-Age matching the token lifetime.
/// With `secure` set (cross-site deployments) it uses `SameSite=None`,
/// which requires the `Secure` attribute; otherwise `SameSite=Lax`.
pub fn build_session_cookie(audience: SessionAudience, token: &str, secure: bool) -> String {
    let attributes = if secure {
        "HttpOnly; Secure; SameSite=None"
    } else {
        "HttpOnly; SameSite=Lax"
    };

    format!(
        "{}={}; Path=/; Max-Age={}; {}",
        audience.cookie_name(),
        token,
        super::jwt::SESSION_TTL_HOURS * 3600,
        attributes
    )
}

/// Builds the Set-Cookie value that clears a session on logout
pub fn build_clear_cookie(audience: SessionAudience, secure: bool) -> String {
    let attributes = if secure {
        "HttpOnly; Secure; SameSite=None"
    } else {
        "HttpOnly; SameSite=Lax"
    };

    format!("{}=; Path=/; Max-Age=0; {}", audience.cookie_name(), attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_cookies(cookies: &str) -> Request {
        Request::builder()
            .header(header::COOKIE, cookies)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_cookie_single() {
        let req = request_with_cookies("adminToken=abc123");
        assert_eq!(extract_cookie(&req, "adminToken"), Some("abc123"));
        assert_eq!(extract_cookie(&req, "userToken"), None);
    }

    #[test]
    fn test_extract_cookie_multiple() {
        // Both namespaces can coexist in one browser
        let req = request_with_cookies("adminToken=aaa; userToken=bbb; theme=dark");
        assert_eq!(extract_cookie(&req, "adminToken"), Some("aaa"));
        assert_eq!(extract_cookie(&req, "userToken"), Some("bbb"));
    }

    #[test]
    fn test_extract_cookie_prefix_not_confused() {
        // "adminTokenOld" must not satisfy a lookup for "adminToken"
        let req = request_with_cookies("adminTokenOld=zzz");
        assert_eq!(extract_cookie(&req, "adminToken"), None);
    }

    #[test]
    fn test_extract_cookie_no_header() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_cookie(&req, "adminToken"), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = build_session_cookie(SessionAudience::Admin, "tok", false);
        assert!(cookie.starts_with("adminToken=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let cookie = build_session_cookie(SessionAudience::Staff, "tok", true);
        assert!(cookie.starts_with("userToken=tok;"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = build_clear_cookie(SessionAudience::Staff, false);
        assert!(cookie.starts_with("userToken=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::MissingToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::RoleDenied.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::DatabaseError("boom".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
