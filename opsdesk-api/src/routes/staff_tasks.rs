/// Task endpoints (staff portal)
///
/// Staff only ever see tasks assigned to them; the scope is enforced in
/// the queries, so an out-of-scope task id answers 404 exactly like a
/// nonexistent one.
///
/// # Endpoints
///
/// - `GET /api/staff/tasks` - List the user's tasks
/// - `GET /api/staff/tasks/:id` - One task
/// - `PUT /api/staff/tasks/edit/:id` - Status-only update

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
use opsdesk_shared::models::task::{Task, TaskFilter, TaskRecord, TaskStatus, UpdateTask};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size, matching the admin task listing
const DEFAULT_LIMIT: i64 = 6;

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<Uuid>,
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

/// List the acting user's tasks
///
/// The unfiltered total also honors the scope: it counts the user's
/// tasks, not everyone's.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter {
        search: query.search,
        status: query.status.as_deref().and_then(TaskStatus::parse),
        project_id: query.project_id,
        assigned_to: Some(user.id),
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (tasks, total, filtered) = Task::list(&state.db, &filter, &page).await?;

    Ok(Json(TaskListResponse {
        message: "Tasks fetched".to_string(),
        tasks,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one of the acting user's tasks
pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let record = Task::find_record(&state.db, id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task fetched".to_string(),
        task: record,
    }))
}

/// Update the status of one of the acting user's tasks
///
/// Staff can move a task's status but nothing else; any transition
/// between known statuses is allowed.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let status = TaskStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid task status: {}", req.status)))?;

    // Scope check before the write; out-of-scope looks like not-found
    let existing = Task::find_record(&state.db, id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let task = Task::update(
        &state.db,
        id,
        UpdateTask {
            status: Some(status),
            ..Default::default()
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Task Status Updated",
            user.id,
            "Task",
            task.id,
            format!("{}: {} -> {}", task.title, existing.status, task.status),
        ),
    )
    .await;

    let record = Task::find_record(&state.db, task.id, Some(user.id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse {
        message: "Task status updated".to_string(),
        task: record,
    }))
}
