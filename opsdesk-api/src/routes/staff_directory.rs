/// Staff directory endpoints (admin portal)
///
/// # Endpoints
///
/// - `POST /api/admin/staff/add` - Create a staff or admin account
/// - `GET /api/admin/staff` - List accounts with summary counts
/// - `GET /api/admin/staff/:id` - Fetch one account
/// - `PUT /api/admin/staff/edit/:id` - Partial update (incl. deactivation)
/// - `DELETE /api/admin/staff/delete/:id` - Hard delete
///
/// Every row carries `projectCount`, derived at read time from developer
/// membership. The listing also returns aggregate totals for the directory
/// header.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use opsdesk_shared::auth::{middleware::CurrentUser, password};
use opsdesk_shared::listing::{PageMeta, PageRequest};
use opsdesk_shared::models::activity_log::{ActivityLog, NewActivity};
use opsdesk_shared::models::user::{
    CreateUser, Role, StaffFilter, StaffRecord, StaffSummary, UpdateUser, User,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for the staff directory
const DEFAULT_LIMIT: i64 = 10;

/// Create account request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// "admin" or "staff"; defaults to "staff"
    pub role: Option<String>,
}

/// Partial update request; only present fields are applied
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStaffRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListStaffQuery {
    pub search: Option<String>,
    pub role: Option<String>,

    /// "active" or "inactive"
    pub status: Option<String>,

    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing response with the directory header counts
#[derive(Debug, Serialize)]
pub struct StaffListResponse {
    pub message: String,
    pub staff: Vec<StaffRecord>,
    pub summary: StaffSummary,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Single-account response
#[derive(Debug, Serialize)]
pub struct StaffResponse {
    pub message: String,
    pub staff: StaffRecord,
}

fn parse_role(value: &str) -> ApiResult<Role> {
    Role::parse(value).ok_or_else(|| ApiError::BadRequest(format!("Invalid role: {}", value)))
}

/// Create an account from the admin directory
///
/// Unlike self-registration, this endpoint may create admin accounts and
/// does not open a session for the new user. Responds 201.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, invalid role, or duplicate email
pub async fn add_staff(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateStaffRequest>,
) -> ApiResult<(StatusCode, Json<StaffResponse>)> {
    req.validate().map_err(validation_error)?;

    let role = req
        .role
        .as_deref()
        .map(parse_role)
        .transpose()?
        .unwrap_or(Role::Staff);

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let created = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
        },
    )
    .await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Staff Added", user.id, "User", created.id, &created.name),
    )
    .await;

    let record = User::find_staff_record(&state.db, created.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created account not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(StaffResponse {
            message: "Staff member added".to_string(),
            staff: record,
        }),
    ))
}

/// List the staff directory
///
/// Filters on `?search=`, `?role=`, and `?status=active|inactive`; an
/// unrecognized role or status value is silently ignored.
pub async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<ListStaffQuery>,
) -> ApiResult<Json<StaffListResponse>> {
    let filter = StaffFilter {
        search: query.search,
        role: query.role.as_deref().and_then(Role::parse),
        is_active: query.status.as_deref().and_then(|s| match s {
            "active" => Some(true),
            "inactive" => Some(false),
            _ => None,
        }),
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let ((staff, total, filtered), summary) = tokio::try_join!(
        User::list_staff(&state.db, &filter, &page),
        User::staff_summary(&state.db),
    )?;

    Ok(Json(StaffListResponse {
        message: "Staff fetched".to_string(),
        staff,
        summary,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one account
pub async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StaffResponse>> {
    let record = User::find_staff_record(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))?;

    Ok(Json(StaffResponse {
        message: "Staff member fetched".to_string(),
        staff: record,
    }))
}

/// Partially update an account
///
/// Setting `isActive: false` deactivates the account; existing sessions
/// stop working on their next request because the middleware re-loads the
/// user from the database. A present password is re-hashed.
pub async fn edit_staff(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStaffRequest>,
) -> ApiResult<Json<StaffResponse>> {
    req.validate().map_err(validation_error)?;

    let role = req.role.as_deref().map(parse_role).transpose()?;

    if let Some(ref email) = req.email {
        if let Some(existing) = User::find_by_email(&state.db, email).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }
        }
    }

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Staff Updated", user.id, "User", updated.id, &updated.name),
    )
    .await;

    let record = User::find_staff_record(&state.db, updated.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))?;

    Ok(Json(StaffResponse {
        message: "Staff member updated".to_string(),
        staff: record,
    }))
}

/// Hard-delete an account
///
/// The account is loaded first so the activity entry can carry a snapshot
/// of what was deleted. Project developer memberships go with it via the
/// join table's cascade.
pub async fn delete_staff(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<super::admin_auth::MessageResponse>> {
    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Staff member not found".to_string()))?;

    User::delete(&state.db, id).await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Staff Deleted", user.id, "User", target.id, &target.name),
    )
    .await;

    Ok(Json(super::admin_auth::MessageResponse {
        message: "Staff member deleted".to_string(),
    }))
}
