/// Task records and assignment queries
///
/// Tasks live inside a project and are always assigned to exactly one
/// user. The assignment invariant (assignee must be in the project's
/// developer set) is enforced by the handlers at creation time; this
/// module only provides the queries.
///
/// Staff reads are scoped by assignee: a task assigned to someone else
/// reads as absent.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::StatusCount;
use crate::listing::{like_pattern, PageRequest};

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Parses a status string; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(TaskStatus::Pending),
            "In Progress" => Some(TaskStatus::InProgress),
            "Completed" => Some(TaskStatus::Completed),
            _ => None,
        }
    }

    /// Status as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task row with project and assignee resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_title: String,
    pub project_status: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Uuid,
    pub assignee_name: String,
    pub assignee_email: String,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub due_date: Option<NaiveDate>,

    /// Defaults to [`TaskStatus::Pending`] when absent
    pub status: Option<TaskStatus>,

    /// Acting user
    pub created_by: Uuid,
}

/// Input for a partial task update
///
/// Only non-None fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

/// Filters for the task listing
///
/// `assigned_to` doubles as the staff scope: staff handlers set it from
/// the session, never from the query string.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,

    /// Exact status filter; invalid status strings never reach this field
    pub status: Option<TaskStatus>,

    /// Restrict to tasks of one project
    pub project_id: Option<Uuid>,

    /// Restrict to tasks assigned to one user
    pub assigned_to: Option<Uuid>,
}

const TASK_COLUMNS: &str = "id, project_id, title, description, assigned_to, status, due_date, \
                            created_by, created_at, updated_at";

// assigned_to has no FK; a task whose assignee was deleted still lists,
// with a placeholder assignee name.
const TASK_RECORD_QUERY: &str = r#"
    SELECT t.id, t.project_id, p.title AS project_title, p.status AS project_status,
           t.title, t.description, t.assigned_to,
           COALESCE(u.name, 'Removed user') AS assignee_name,
           COALESCE(u.email, '') AS assignee_email,
           t.status, t.due_date,
           t.created_by, t.created_at, t.updated_at
    FROM tasks t
    JOIN projects p ON p.id = t.project_id
    LEFT JOIN users u ON u.id = t.assigned_to
"#;

impl Task {
    /// Creates a new task
    ///
    /// Callers validate the assignment invariant before calling this.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(TaskStatus::Pending);

        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (project_id, title, description, assigned_to, status, due_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.project_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_to)
        .bind(status.as_str())
        .bind(data.due_date)
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a task by ID (bare row, no relations)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Loads a task with project and assignee resolved
    ///
    /// When `scope` is set, the task is only returned if assigned to that
    /// user; out-of-scope ids read as absent.
    pub async fn find_record(
        pool: &PgPool,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<TaskRecord>, sqlx::Error> {
        sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            {TASK_RECORD_QUERY}
            WHERE t.id = $1
              AND ($2::uuid IS NULL OR t.assigned_to = $2)
            "#,
        ))
        .bind(id)
        .bind(scope)
        .fetch_optional(pool)
        .await
    }

    /// Lists tasks newest first
    ///
    /// Returns the page plus the unfiltered and filtered totals; the two
    /// counts and the page query run concurrently. The unfiltered total
    /// honors the assignee scope, so a staff user's "total" counts only
    /// their own tasks.
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> Result<(Vec<TaskRecord>, i64, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);
        let status = filter.status.map(|s| s.as_str());

        let total_fut = async {
            let (count,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM tasks WHERE ($1::uuid IS NULL OR assigned_to = $1)",
            )
            .bind(filter.assigned_to)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let filtered_fut = async {
            let (count,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM tasks
                WHERE ($1::text IS NULL OR title ILIKE $1)
                  AND ($2::text IS NULL OR status = $2)
                  AND ($3::uuid IS NULL OR project_id = $3)
                  AND ($4::uuid IS NULL OR assigned_to = $4)
                "#,
            )
            .bind(search.as_deref())
            .bind(status)
            .bind(filter.project_id)
            .bind(filter.assigned_to)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let page_fut = async {
            sqlx::query_as::<_, TaskRecord>(&format!(
                r#"
                {TASK_RECORD_QUERY}
                WHERE ($1::text IS NULL OR t.title ILIKE $1)
                  AND ($2::text IS NULL OR t.status = $2)
                  AND ($3::uuid IS NULL OR t.project_id = $3)
                  AND ($4::uuid IS NULL OR t.assigned_to = $4)
                ORDER BY t.created_at DESC
                LIMIT $5 OFFSET $6
                "#,
            ))
            .bind(search.as_deref())
            .bind(status)
            .bind(filter.project_id)
            .bind(filter.assigned_to)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
        };

        let (total, filtered, records) = tokio::try_join!(total_fut, filtered_fut, page_fut)?;

        Ok((records, total, filtered))
    }

    /// Tasks of one project assigned to one user, newest first
    ///
    /// Used by the staff project detail view.
    pub async fn list_for_project_assignee(
        pool: &PgPool,
        project_id: Uuid,
        assigned_to: Uuid,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            {TASK_RECORD_QUERY}
            WHERE t.project_id = $1 AND t.assigned_to = $2
            ORDER BY t.created_at DESC
            "#,
        ))
        .bind(project_id)
        .bind(assigned_to)
        .fetch_all(pool)
        .await
    }

    /// The user's most recent tasks, for the staff dashboard
    pub async fn recent_for_assignee(
        pool: &PgPool,
        assigned_to: Uuid,
        limit: i64,
    ) -> Result<Vec<TaskRecord>, sqlx::Error> {
        sqlx::query_as::<_, TaskRecord>(&format!(
            r#"
            {TASK_RECORD_QUERY}
            WHERE t.assigned_to = $1
            ORDER BY t.created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(assigned_to)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Applies a partial update
    ///
    /// Returns `None` when no row matches the id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a task by ID
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all tasks
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Task count per status, optionally scoped to one assignee
    ///
    /// Admin dashboard passes None; staff dashboard passes the session
    /// user.
    pub async fn status_breakdown(
        pool: &PgPool,
        assigned_to: Option<Uuid>,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            r#"
            SELECT status, COUNT(*) AS count
            FROM tasks
            WHERE ($1::uuid IS NULL OR assigned_to = $1)
            GROUP BY status
            "#,
        )
        .bind(assigned_to)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_exact_values_only() {
        assert_eq!(TaskStatus::parse("Pending"), Some(TaskStatus::Pending));
        assert_eq!(
            TaskStatus::parse("In Progress"),
            Some(TaskStatus::InProgress)
        );
        assert_eq!(TaskStatus::parse("Completed"), Some(TaskStatus::Completed));

        assert_eq!(TaskStatus::parse("Done"), None);
        assert_eq!(TaskStatus::parse("pending"), None);
        assert_eq!(TaskStatus::parse(""), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_update_task_default_is_noop() {
        let update = UpdateTask::default();
        assert!(update.title.is_none());
        assert!(update.status.is_none());
    }
}
