/// Staff session endpoints
///
/// The staff portal authenticates with the `userToken` cookie, independent
/// of the admin portal's `adminToken`, so one browser can hold both
/// sessions at once.
///
/// # Endpoints
///
/// - `POST /api/staff/register` - Self-service staff account creation
/// - `POST /api/staff/login` - Open a staff session
/// - `GET /api/staff/getInfo` - Current user, sans password hash
/// - `POST /api/staff/logout` - Clear the staff session cookie

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::AppendHeaders,
    Extension, Json,
};
use opsdesk_shared::auth::{
    jwt::{self, SessionAudience},
    middleware::{build_clear_cookie, build_session_cookie, CurrentUser},
    password,
};
use opsdesk_shared::models::{
    activity_log::{ActivityLog, NewActivity},
    user::{CreateUser, Role, User},
};
use serde::Deserialize;
use validator::Validate;

use super::admin_auth::{MessageResponse, SessionResponse, SessionUser};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

type SetCookie = AppendHeaders<[(header::HeaderName, String); 1]>;

/// Staff self-registration
///
/// Creates a staff account and opens a session in one step. Responds 201
/// with the session cookie set.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, SetCookie, Json<SessionResponse>)> {
    req.validate().map_err(validation_error)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: Role::Staff,
        },
    )
    .await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Staff Registered", user.id, "User", user.id, &user.name),
    )
    .await;

    let claims = jwt::Claims::new(user.id, SessionAudience::Staff);
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = build_session_cookie(SessionAudience::Staff, &token, state.cookie_secure());

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(SessionResponse {
            message: "Registration successful".to_string(),
            user: SessionUser {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
            },
        }),
    ))
}

/// Staff login
///
/// Verifies credentials, requires the staff role and an active account,
/// and sets the `userToken` session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email, wrong password, or not staff
/// - `403 Forbidden`: Account deactivated
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(SetCookie, Json<SessionResponse>)> {
    req.validate().map_err(validation_error)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if user.role != "staff" {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let claims = jwt::Claims::new(user.id, SessionAudience::Staff);
    let token = jwt::create_token(&claims, state.jwt_secret())?;
    let cookie = build_session_cookie(SessionAudience::Staff, &token, state.cookie_secure());

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

/// Current staff info
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

/// Staff logout
///
/// Clears the `userToken` cookie. Succeeds whether or not a session was
/// present.
pub async fn logout(State(state): State<AppState>) -> (SetCookie, Json<MessageResponse>) {
    let cookie = build_clear_cookie(SessionAudience::Staff, state.cookie_secure());

    (
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
