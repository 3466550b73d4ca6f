/// Admin session endpoints
///
/// The admin portal authenticates with the `adminToken` cookie. Login is
/// restricted to accounts holding the admin role; a valid staff password
/// never opens an admin session.
///
/// # Endpoints
///
/// - `POST /api/admin/login` - Open an admin session
/// - `GET /api/admin/getInfo` - Current admin, sans password hash
/// - `POST /api/admin/logout` - Clear the admin session cookie

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::header,
    response::AppendHeaders,
    Extension, Json,
};
use opsdesk_shared::auth::{
    jwt::{self, SessionAudience},
    middleware::{build_clear_cookie, build_session_cookie, CurrentUser},
    password,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Wire view of the acting user, without the password hash
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Login / getInfo response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: String,
    pub user: SessionUser,
}

/// Message-only response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

type SetCookie = AppendHeaders<[(header::HeaderName, String); 1]>;

/// Admin login
///
/// Verifies credentials, requires the admin role and an active account,
/// and sets the `adminToken` session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email, wrong password, or not an admin
/// - `403 Forbidden`: Account deactivated
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(SetCookie, Json<SessionResponse>)> {
    req.validate().map_err(validation_error)?;

    let user = opsdesk_shared::models::user::User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // A staff account with the right password is still not an admin
    if user.role != "admin" {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let claims = jwt::Claims::new(user.id, SessionAudience::Admin);
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = build_session_cookie(SessionAudience::Admin, &token, state.cookie_secure());

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            message: "Login successful".to_string(),
            user: SessionUser {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
            },
        }),
    ))
}

/// Current admin info
///
/// Returns the acting user from the session, never the password hash.
pub async fn get_info(Extension(user): Extension<CurrentUser>) -> Json<SessionResponse> {
    Json(SessionResponse {
        message: "Authenticated".to_string(),
        user: SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    })
}

/// Admin logout
///
/// Clears the `adminToken` cookie. Succeeds whether or not a session was
/// present.
pub async fn logout(State(state): State<AppState>) -> (SetCookie, Json<MessageResponse>) {
    let cookie = build_clear_cookie(SessionAudience::Admin, state.cookie_secure());

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
