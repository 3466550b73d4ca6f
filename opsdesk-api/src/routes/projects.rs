/// Project CRUD endpoints (admin portal)
///
/// # Endpoints
///
/// - `POST /api/admin/project/add` - Create a project
/// - `GET /api/admin/project` - List projects (search, status, clientId)
/// - `GET /api/admin/project/:id` - Fetch one project
/// - `PUT /api/admin/project/edit/:id` - Partial update
/// - `DELETE /api/admin/project/delete/:id` - Delete
///
/// Projects carry a developer set (`assignedDevelopers`); that set is what
/// task assignment is validated against.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use opsdesk_shared::auth::middleware::CurrentUser;
use opsdesk_shared::listing::{PageMeta, PageRequest};
use opsdesk_shared::models::activity_log::{ActivityLog, NewActivity};
use opsdesk_shared::models::client::Client;
use opsdesk_shared::models::project::{
    CreateProject, Project, ProjectFilter, ProjectRecord, ProjectStatus, UpdateProject,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for project listings
const DEFAULT_LIMIT: i64 = 5;

/// Project timeline as the SPA sends it
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub client_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub timeline: Timeline,

    /// Initial developer set
    pub assigned_developers: Vec<Uuid>,

    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Partial update request; only present fields are applied
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub timeline: Option<Timeline>,
    pub assigned_developers: Option<Vec<Uuid>>,
    pub status: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub message: String,
    pub projects: Vec<ProjectRecord>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Single-project response
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: String,
    pub project: ProjectRecord,
}

fn parse_status(value: &str) -> ApiResult<ProjectStatus> {
    ProjectStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid project status: {}", value)))
}

/// Create a project
///
/// Responds 201 with the stored record.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, missing or invalid status, or
///   unknown client
pub async fn add_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    req.validate().map_err(validation_error)?;

    let status = parse_status(&req.status)?;

    // The client reference is caller-supplied; an unknown id is a bad
    // request, not a missing resource
    if Client::find_by_id(&state.db, req.client_id).await?.is_none() {
        return Err(ApiError::BadRequest("Invalid client id".to_string()));
    }

    let project = Project::create(
        &state.db,
        CreateProject {
            client_id: req.client_id,
            title: req.title,
            description: req.description,
            start_date: req.timeline.start_date,
            end_date: req.timeline.end_date,
            status: Some(status),
            developer_ids: req.assigned_developers,
            created_by: user.id,
        },
    )
    .await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Project Created",
            user.id,
            "Project",
            project.id,
            project.title.clone(),
        ),
    )
    .await;

    let record = Project::find_record(&state.db, project.id, None)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created project not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: "Project created".to_string(),
            project: record,
        }),
    ))
}

/// List projects
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<ProjectListResponse>> {
    let filter = ProjectFilter {
        search: query.search,
        status: query.status.as_deref().and_then(ProjectStatus::parse),
        client_id: query.client_id,
        developer: None,
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (projects, total, filtered) = Project::list(&state.db, &filter, &page).await?;

    Ok(Json(ProjectListResponse {
        message: "Projects fetched".to_string(),
        projects,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one project
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectResponse>> {
    let record = Project::find_record(&state.db, id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse {
        message: "Project fetched".to_string(),
        project: record,
    }))
}

/// Partially update a project
///
/// A changed `clientId` is re-validated; a present `assignedDevelopers`
/// replaces the whole developer set. Existing tasks are not re-checked
/// against the new set: the assignment invariant holds at task creation
/// time only.
pub async fn edit_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    req.validate().map_err(validation_error)?;

    let status = req.status.as_deref().map(parse_status).transpose()?;

    if let Some(client_id) = req.client_id {
        if Client::find_by_id(&state.db, client_id).await?.is_none() {
            return Err(ApiError::BadRequest("Invalid client id".to_string()));
        }
    }

    let timeline = req.timeline.unwrap_or_default();

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            client_id: req.client_id,
            title: req.title,
            description: req.description,
            start_date: timeline.start_date,
            end_date: timeline.end_date,
            status,
            developer_ids: req.assigned_developers,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Project Updated",
            user.id,
            "Project",
            project.id,
            project.title.clone(),
        ),
    )
    .await;

    let record = Project::find_record(&state.db, project.id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse {
        message: "Project updated".to_string(),
        project: record,
    }))
}

/// Delete a project
///
/// The project is loaded first so the activity entry can carry a snapshot
/// of what was deleted.
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<super::admin_auth::MessageResponse>> {
    let project = Project::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Project::delete(&state.db, id).await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Project Deleted",
            user.id,
            "Project",
            project.id,
            project.title.clone(),
        ),
    )
    .await;

    Ok(Json(super::admin_auth::MessageResponse {
        message: "Project deleted".to_string(),
    }))
}
