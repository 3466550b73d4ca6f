/// Project endpoints (staff portal)
///
/// Staff only ever see projects whose developer set includes them. The
/// scope is enforced in the queries themselves, so an out-of-scope
/// project id answers 404 exactly like a nonexistent one.
///
/// # Endpoints
///
/// - `GET /api/staff/projects` - List the user's projects
/// - `GET /api/staff/projects/:id` - One project plus the user's own tasks on it
/// - `PUT /api/staff/projects/edit/:id` - Status-only update

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use opsdesk_shared::auth::middleware::CurrentUser;
use opsdesk_shared::listing::{PageMeta, PageRequest};
use opsdesk_shared::models::activity_log::{ActivityLog, NewActivity};
use opsdesk_shared::models::project::{
    Project, ProjectFilter, ProjectRecord, ProjectStatus, UpdateProject,
};
use opsdesk_shared::models::task::{Task, TaskRecord};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size, matching the admin project listing
const DEFAULT_LIMIT: i64 = 5;

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Status-only update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub message: String,
    pub projects: Vec<ProjectRecord>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Project detail with the user's own tasks on it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    pub message: String,
    pub project: ProjectRecord,
    pub my_tasks: Vec<TaskRecord>,
}

/// Single-project response
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: String,
    pub project: ProjectRecord,
}

/// List the acting user's projects
///
/// The unfiltered total also honors the scope: it counts the user's
/// projects, not everyone's.
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<ProjectListResponse>> {
    let filter = ProjectFilter {
        search: query.search,
        status: query.status.as_deref().and_then(ProjectStatus::parse),
        client_id: None,
        developer: Some(user.id),
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (projects, total, filtered) = Project::list(&state.db, &filter, &page).await?;

    Ok(Json(ProjectListResponse {
        message: "Projects fetched".to_string(),
        projects,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one of the acting user's projects
///
/// Includes the user's own tasks on that project so the detail view needs
/// no second request.
pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetailResponse>> {
    let record = Project::find_record(&state.db, id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let my_tasks = Task::list_for_project_assignee(&state.db, id, user.id).await?;

    Ok(Json(ProjectDetailResponse {
        message: "Project fetched".to_string(),
        project: record,
        my_tasks,
    }))
}

/// Update the status of one of the acting user's projects
///
/// Staff can move a project's status but nothing else; any transition
/// between known statuses is allowed.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let status = ProjectStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid project status: {}", req.status)))?;

    // Scope check before the write; out-of-scope looks like not-found
    let existing = Project::find_record(&state.db, id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let project = Project::update(
        &state.db,
        id,
        UpdateProject {
            status: Some(status),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Project Status Updated",
            user.id,
            "Project",
            project.id,
            format!("{}: {} -> {}", project.title, existing.status, project.status),
        ),
    )
    .await;

    let record = Project::find_record(&state.db, project.id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    Ok(Json(ProjectResponse {
        message: "Project status updated".to_string(),
        project: record,
    }))
}
