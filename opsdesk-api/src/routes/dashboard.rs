/// Dashboard endpoints
///
/// Two shapes, one per portal. The admin dashboard aggregates across the
/// whole system; the staff dashboard is scoped to the acting user's
/// projects and tasks. Both fan their queries out concurrently.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use opsdesk_shared::auth::middleware::CurrentUser;
use opsdesk_shared::models::activity_log::{ActivityLog, ActivityRecord};
use opsdesk_shared::models::client::Client;
use opsdesk_shared::models::project::Project;
use opsdesk_shared::models::task::{Task, TaskRecord};
use opsdesk_shared::models::StatusCount;
use serde::Serialize;

/// How many recent activity entries each dashboard shows
const RECENT_ACTIVITY_LIMIT: i64 = 10;

/// How many upcoming tasks the staff dashboard shows
const RECENT_TASK_LIMIT: i64 = 5;

/// Admin dashboard payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    pub message: String,
    pub total_clients: i64,
    pub total_projects: i64,
    pub total_tasks: i64,
    pub project_status_breakdown: Vec<StatusCount>,
    pub recent_activity: Vec<ActivityRecord>,
}

/// Staff dashboard payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDashboardResponse {
    pub message: String,
    pub assigned_projects: i64,
    pub task_status_breakdown: Vec<StatusCount>,
    pub recent_tasks: Vec<TaskRecord>,
    pub recent_activity: Vec<ActivityRecord>,
}

/// System-wide counts for the admin dashboard
pub async fn admin_dashboard(
    State(state): State<AppState>,
) -> ApiResult<Json<AdminDashboardResponse>> {
    let (total_clients, total_projects, total_tasks, project_status_breakdown, recent_activity) =
        tokio::try_join!(
            Client::count(&state.db),
            Project::count(&state.db),
            Task::count(&state.db),
            Project::status_breakdown(&state.db),
            ActivityLog::recent(&state.db, RECENT_ACTIVITY_LIMIT),
        )?;

    Ok(Json(AdminDashboardResponse {
        message: "Dashboard fetched".to_string(),
        total_clients,
        total_projects,
        total_tasks,
        project_status_breakdown,
        recent_activity,
    }))
}

/// Per-user counts for the staff dashboard
///
/// Everything here is scoped to the acting user: projects they develop
/// on, tasks assigned to them, and their own recent activity.
pub async fn staff_dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<StaffDashboardResponse>> {
    let (assigned_projects, task_status_breakdown, recent_tasks, recent_activity) = tokio::try_join!(
        Project::count_for_developer(&state.db, user.id),
        Task::status_breakdown(&state.db, Some(user.id)),
        Task::recent_for_assignee(&state.db, user.id, RECENT_TASK_LIMIT),
        ActivityLog::recent_for_user(&state.db, user.id, RECENT_ACTIVITY_LIMIT),
    )?;

    Ok(Json(StaffDashboardResponse {
        message: "Dashboard fetched".to_string(),
        assigned_projects,
        task_status_breakdown,
        recent_tasks,
        recent_activity,
    }))
}
