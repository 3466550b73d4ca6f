/// Session token generation and validation
///
/// Session tokens are JWTs signed with HS256 (HMAC-SHA256). Each token
/// carries the user id as subject plus an audience claim naming the session
/// namespace it belongs to, so an admin token presented on the staff cookie
/// (or vice versa) is rejected during validation.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: Fixed 24 hours, no refresh
/// - **Validation**: Signature, expiration, issuer, and audience checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use opsdesk_shared::auth::jwt::{create_token, validate_token, Claims, SessionAudience};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(user_id, SessionAudience::Admin);
/// let token = create_token(&claims, "your-secret-key")?;
///
/// let validated = validate_token(&token, "your-secret-key", SessionAudience::Admin)?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed session lifetime. Expiry forces re-login; there is no refresh flow.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token (bad signature, malformed, wrong issuer)
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token belongs to the other session namespace
    #[error("Token audience mismatch: expected {expected}")]
    WrongAudience { expected: String },
}

/// Session namespace a token belongs to
///
/// Admin and staff sessions are independent: they use different cookie
/// names and different audience claims, so both can coexist in one browser
/// without collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAudience {
    /// Admin portal session (`adminToken` cookie)
    Admin,

    /// Staff portal session (`userToken` cookie)
    Staff,
}

impl SessionAudience {
    /// Name of the cookie this namespace is stored under
    pub fn cookie_name(&self) -> &'static str {
        match self {
            SessionAudience::Admin => "adminToken",
            SessionAudience::Staff => "userToken",
        }
    }

    /// Audience claim value
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAudience::Admin => "admin",
            SessionAudience::Staff => "staff",
        }
    }
}

/// Session token claims
///
/// Standard claims plus the OpsDesk session namespace:
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "opsdesk")
/// - `aud`: Session namespace ("admin" or "staff")
/// - `iat` / `exp` / `nbf`: Issued-at, expiration, not-before timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "opsdesk"
    pub iss: String,

    /// Audience - session namespace
    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims with the fixed 24-hour expiration
    pub fn new(user_id: Uuid, audience: SessionAudience) -> Self {
        Self::with_expiration(user_id, audience, Duration::hours(SESSION_TTL_HOURS))
    }

    /// Creates claims with a custom expiration (used by tests to produce
    /// already-expired tokens)
    pub fn with_expiration(user_id: Uuid, audience: SessionAudience, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: "opsdesk".to_string(),
            aud: audience.as_str().to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed session token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token against one session namespace
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired and is not used before `nbf`
/// - Issuer is "opsdesk"
/// - Audience matches the expected session namespace
///
/// # Errors
///
/// Expired tokens, audience mismatches, and any other validation failure
/// each map to a distinct [`JwtError`] kind; the HTTP layer collapses all
/// of them into 401.
pub fn validate_token(
    token: &str,
    secret: &str,
    audience: SessionAudience,
) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["opsdesk"]);
    validation.set_audience(&[audience.as_str()]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => JwtError::WrongAudience {
            expected: audience.as_str().to_string(),
        },
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_audience_cookie_names() {
        assert_eq!(SessionAudience::Admin.cookie_name(), "adminToken");
        assert_eq!(SessionAudience::Staff.cookie_name(), "userToken");
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, SessionAudience::Admin);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "opsdesk");
        assert_eq!(claims.aud, "admin");
        assert!(!claims.is_expired());
        // Fixed 24h lifetime
        assert!(claims.exp - claims.iat == SESSION_TTL_HOURS * 3600);
    }

    #[test]
    fn test_create_and_validate_token() {
        let user_id = Uuid::new_v4();

        let claims = Claims::new(user_id, SessionAudience::Staff);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated =
            validate_token(&token, SECRET, SessionAudience::Staff).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.aud, "staff");
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), SessionAudience::Admin);
        let token = create_token(&claims, SECRET).expect("Should create token");

        let result = validate_token(&token, "wrong-secret-key-also-32-bytes-long", SessionAudience::Admin);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::with_expiration(
            Uuid::new_v4(),
            SessionAudience::Admin,
            Duration::seconds(-3600), // already expired
        );

        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).expect("Should create token");
        let result = validate_token(&token, SECRET, SessionAudience::Admin);

        assert!(matches!(result.unwrap_err(), JwtError::Expired));
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        // An admin token presented on the staff namespace must not validate.
        let claims = Claims::new(Uuid::new_v4(), SessionAudience::Admin);
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, SECRET, SessionAudience::Staff);
        assert!(matches!(result.unwrap_err(), JwtError::WrongAudience { .. }));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let claims = Claims::new(Uuid::new_v4(), SessionAudience::Staff);
        let mut token = create_token(&claims, SECRET).unwrap();
        // Flip a character in the payload segment
        let mid = token.len() / 2;
        let replacement = if token.as_bytes()[mid] == b'a' { "b" } else { "a" };
        token.replace_range(mid..mid + 1, replacement);

        assert!(validate_token(&token, SECRET, SessionAudience::Staff).is_err());
    }
}
