/// Task CRUD endpoints (admin portal)
///
/// # Endpoints
///
/// - `POST /api/admin/task/add` - Create a task
/// - `GET /api/admin/task` - List tasks (search, status, projectId, assignedTo)
/// - `GET /api/admin/task/:id` - Fetch one task
/// - `PUT /api/admin/task/edit/:id` - Partial update
/// - `DELETE /api/admin/task/delete/:id` - Delete
///
/// # Assignment invariant
///
/// A task can only be created for a user who is in the target project's
/// developer set. A violation responds 400 with the `allowedStaff` list
/// (id, name, email of every valid assignee) so the client can correct
/// the form without another round trip. The invariant is checked at
/// creation (and when an update moves the assignee); removing a developer
/// from a project later does not retroactively invalidate their tasks.

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
use opsdesk_shared::models::project::Project;
use opsdesk_shared::models::task::{
    CreateTask, Task, TaskFilter, TaskRecord, TaskStatus, UpdateTask,
};
use opsdesk_shared::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for task listings
const DEFAULT_LIMIT: i64 = 6;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub project_id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub assigned_to: Uuid,

    pub due_date: NaiveDate,

    /// Optional; defaults to "Pending"
    pub status: Option<String>,
}

/// Partial update request; only present fields are applied
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub message: String,
    pub tasks: Vec<TaskRecord>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Single-task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: TaskRecord,
}

fn parse_status(value: &str) -> ApiResult<TaskStatus> {
    TaskStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid task status: {}", value)))
}

/// Verifies the assignment invariant for one project/assignee pair
///
/// On violation, returns the corrective error carrying the project's
/// developer set.
async fn check_assignment(
    state: &AppState,
    project_id: Uuid,
    assigned_to: Uuid,
) -> ApiResult<()> {
    if Project::is_developer(&state.db, project_id, assigned_to).await? {
        return Ok(());
    }

    let allowed_staff = Project::allowed_staff(&state.db, project_id).await?;

    Err(ApiError::InvalidAssignment {
        message: "Assignee is not a developer on this project".to_string(),
        allowed_staff,
    })
}

/// Create a task
///
/// Responds 201 with the stored record.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, invalid status, or assignee
///   outside the project's developer set (with `allowedStaff`)
/// - `404 Not Found`: Unknown project or assignee
pub async fn add_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate().map_err(validation_error)?;

    let status = req.status.as_deref().map(parse_status).transpose()?;

    if Project::find_by_id(&state.db, req.project_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    if User::find_by_id(&state.db, req.assigned_to).await?.is_none() {
        return Err(ApiError::NotFound("Assignee not found".to_string()));
    }

    check_assignment(&state, req.project_id, req.assigned_to).await?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            assigned_to: req.assigned_to,
            due_date: Some(req.due_date),
            status,
            created_by: user.id,
        },
    )
    .await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Task Created", user.id, "Task", task.id, task.title.clone()),
    )
    .await;

    let record = Task::find_record(&state.db, task.id, None)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created task not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created".to_string(),
            task: record,
        }),
    ))
}

/// List tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter {
        search: query.search,
        status: query.status.as_deref().and_then(TaskStatus::parse),
        project_id: query.project_id,
        assigned_to: query.assigned_to,
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (tasks, total, filtered) = Task::list(&state.db, &filter, &page).await?;

    Ok(Json(TaskListResponse {
        message: "Tasks fetched".to_string(),
        tasks,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one task
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let record = Task::find_record(&state.db, id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task fetched".to_string(),
        task: record,
    }))
}

/// Partially update a task
///
/// Moving the assignee re-checks the assignment invariant against the
/// task's project.
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    req.validate().map_err(validation_error)?;

    let status = req.status.as_deref().map(parse_status).transpose()?;

    let existing = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if let Some(assigned_to) = req.assigned_to {
        if User::find_by_id(&state.db, assigned_to).await?.is_none() {
            return Err(ApiError::NotFound("Assignee not found".to_string()));
        }
        check_assignment(&state, existing.project_id, assigned_to).await?;
    }

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            assigned_to: req.assigned_to,
            status,
            due_date: req.due_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Task Updated", user.id, "Task", task.id, task.title.clone()),
    )
    .await;

    let record = Task::find_record(&state.db, task.id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task updated".to_string(),
        task: record,
    }))
}

/// Delete a task
///
/// The task is loaded first so the activity entry can carry a snapshot
/// of what was deleted.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<super::admin_auth::MessageResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Task::delete(&state.db, id).await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new("Task Deleted", user.id, "Task", task.id, task.title.clone()),
    )
    .await;

    Ok(Json(super::admin_auth::MessageResponse {
        message: "Task deleted".to_string(),
    }))
}
