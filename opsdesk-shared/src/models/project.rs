/// Project model with its developer set
///
/// A project belongs to a client and carries a set of assigned developers
/// (the `project_developers` join table). That set is the authority for
/// task assignment: a task may only be assigned to a member of its
/// project's developer set.
///
/// Listing and by-id reads return [`ProjectRecord`]s with the client and
/// the developer set resolved in one query (`json_agg` over the join).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::user::StaffRef;
use super::StatusCount;
use crate::listing::{like_pattern, PageRequest};

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Paused,
    Closed,
}

impl ProjectStatus {
    /// Parses a status string; unknown values yield `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(ProjectStatus::New),
            "In Progress" => Some(ProjectStatus::InProgress),
            "Completed" => Some(ProjectStatus::Completed),
            "Paused" => Some(ProjectStatus::Paused),
            "Closed" => Some(ProjectStatus::Closed),
            _ => None,
        }
    }

    /// Status as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::New => "New",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::Paused => "Paused",
            ProjectStatus::Closed => "Closed",
        }
    }
}

/// Project row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project row with client and developer set resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_company: String,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub developers: Json<Vec<StaffRef>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub client_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Defaults to [`ProjectStatus::New`] when absent
    pub status: Option<ProjectStatus>,

    /// Initial developer set
    pub developer_ids: Vec<Uuid>,

    /// Acting user
    pub created_by: Uuid,
}

/// Input for a partial project update
///
/// Only non-None fields are applied. A present `developer_ids` replaces
/// the whole developer set.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub developer_ids: Option<Vec<Uuid>>,
}

/// Filters for the project listing
///
/// `developer` is the staff scope: it is set by staff handlers from the
/// session, never from the query string.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Case-insensitive substring match on the title
    pub search: Option<String>,

    /// Exact status filter; invalid status strings never reach this field
    pub status: Option<ProjectStatus>,

    /// Restrict to projects of one client
    pub client_id: Option<Uuid>,

    /// Restrict to projects the given user is a developer on
    pub developer: Option<Uuid>,
}

const PROJECT_COLUMNS: &str = "id, client_id, title, description, start_date, end_date, status, \
                               created_by, created_at, updated_at";

// The developer set is aggregated per project; the FILTER clause keeps
// developer-less projects at an empty array instead of [null].
const PROJECT_RECORD_QUERY: &str = r#"
    SELECT p.id, p.client_id, c.name AS client_name, c.company AS client_company,
           p.title, p.description, p.start_date, p.end_date, p.status,
           COALESCE(
               json_agg(
                   json_build_object('id', d.id, 'name', d.name, 'email', d.email)
                   ORDER BY d.name
               ) FILTER (WHERE d.id IS NOT NULL),
               '[]'::json
           ) AS developers,
           p.created_by, p.created_at, p.updated_at
    FROM projects p
    JOIN clients c ON c.id = p.client_id
    LEFT JOIN project_developers pd ON pd.project_id = p.id
    LEFT JOIN users d ON d.id = pd.user_id
"#;

const SCOPE_CLAUSE: &str = r#"($4::uuid IS NULL OR EXISTS (
    SELECT 1 FROM project_developers s
    WHERE s.project_id = p.id AND s.user_id = $4
))"#;

impl Project {
    /// Creates a project together with its initial developer set
    ///
    /// The insert and the developer rows go in one transaction so a
    /// half-created project is never visible.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(ProjectStatus::New);

        let mut tx = pool.begin().await?;

        let project = sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (client_id, title, description, start_date, end_date, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PROJECT_COLUMNS}
            "#,
        ))
        .bind(data.client_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(status.as_str())
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO project_developers (project_id, user_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(project.id)
        .bind(&data.developer_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(project)
    }

    /// Finds a project by ID (bare row, no relations)
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Loads a project with client and developers resolved
    ///
    /// When `scope` is set, the project is only returned if that user is
    /// in its developer set; anything else reads as absent. Staff by-id
    /// reads pass their own id here so out-of-scope ids 404 rather than
    /// leak existence.
    pub async fn find_record(
        pool: &PgPool,
        id: Uuid,
        scope: Option<Uuid>,
    ) -> Result<Option<ProjectRecord>, sqlx::Error> {
        sqlx::query_as::<_, ProjectRecord>(&format!(
            r#"
            {PROJECT_RECORD_QUERY}
            WHERE p.id = $1
              AND ($2::uuid IS NULL OR EXISTS (
                  SELECT 1 FROM project_developers s
                  WHERE s.project_id = p.id AND s.user_id = $2
              ))
            GROUP BY p.id, c.name, c.company
            "#,
        ))
        .bind(id)
        .bind(scope)
        .fetch_optional(pool)
        .await
    }

    /// Lists projects newest first
    ///
    /// Returns the page plus the unfiltered and filtered totals; the two
    /// counts and the page query run concurrently. The unfiltered total
    /// still honors the developer scope, so a staff user's "total" is the
    /// size of their own project set.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ProjectRecord>, i64, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);
        let status = filter.status.map(|s| s.as_str());

        let total_fut = async {
            let (count,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM projects p
                WHERE ($1::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM project_developers s
                    WHERE s.project_id = p.id AND s.user_id = $1
                ))
                "#,
            )
            .bind(filter.developer)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let filtered_fut = async {
            let (count,): (i64,) = sqlx::query_as(&format!(
                r#"
                SELECT COUNT(*) FROM projects p
                WHERE ($1::text IS NULL OR p.title ILIKE $1)
                  AND ($2::text IS NULL OR p.status = $2)
                  AND ($3::uuid IS NULL OR p.client_id = $3)
                  AND {SCOPE_CLAUSE}
                "#,
            ))
            .bind(search.as_deref())
            .bind(status)
            .bind(filter.client_id)
            .bind(filter.developer)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let page_fut = async {
            sqlx::query_as::<_, ProjectRecord>(&format!(
                r#"
                {PROJECT_RECORD_QUERY}
                WHERE ($1::text IS NULL OR p.title ILIKE $1)
                  AND ($2::text IS NULL OR p.status = $2)
                  AND ($3::uuid IS NULL OR p.client_id = $3)
                  AND {SCOPE_CLAUSE}
                GROUP BY p.id, c.name, c.company
                ORDER BY p.created_at DESC
                LIMIT $5 OFFSET $6
                "#,
            ))
            .bind(search.as_deref())
            .bind(status)
            .bind(filter.client_id)
            .bind(filter.developer)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
        };

        let (total, filtered, records) = tokio::try_join!(total_fut, filtered_fut, page_fut)?;

        Ok((records, total, filtered))
    }

    /// Applies a partial update
    ///
    /// A present `developer_ids` replaces the developer set; the column
    /// updates and the set replacement share one transaction.
    ///
    /// Returns `None` when no row matches the id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE projects SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.client_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", client_id = ${}", bind_count));
        }
        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.start_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", start_date = ${}", bind_count));
        }
        if data.end_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", end_date = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {PROJECT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Project>(&query).bind(id);

        if let Some(client_id) = data.client_id {
            q = q.bind(client_id);
        }
        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(start_date) = data.start_date {
            q = q.bind(start_date);
        }
        if let Some(end_date) = data.end_date {
            q = q.bind(end_date);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }

        let project = q.fetch_optional(&mut *tx).await?;

        let Some(project) = project else {
            tx.rollback().await?;
            return Ok(None);
        };

        if let Some(developer_ids) = data.developer_ids {
            sqlx::query("DELETE FROM project_developers WHERE project_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO project_developers (project_id, user_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&developer_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(project))
    }

    /// Deletes a project by ID
    ///
    /// Developer rows go with it (ON DELETE CASCADE).
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a user is in the project's developer set
    pub async fn is_developer(
        pool: &PgPool,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM project_developers
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the project's developer set
    ///
    /// This is the `allowedStaff` payload returned when a task assignment
    /// names a user outside the set.
    pub async fn allowed_staff(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<StaffRef>, sqlx::Error> {
        sqlx::query_as::<_, StaffRef>(
            r#"
            SELECT u.id, u.name, u.email
            FROM project_developers pd
            JOIN users u ON u.id = pd.user_id
            WHERE pd.project_id = $1
            ORDER BY u.name
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Counts all projects
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Counts projects the given user is a developer on
    pub async fn count_for_developer(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM project_developers WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Project count per status for the admin dashboard
    pub async fn status_breakdown(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM projects GROUP BY status",
        )
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_exact_values_only() {
        assert_eq!(ProjectStatus::parse("New"), Some(ProjectStatus::New));
        assert_eq!(
            ProjectStatus::parse("In Progress"),
            Some(ProjectStatus::InProgress)
        );
        assert_eq!(
            ProjectStatus::parse("Completed"),
            Some(ProjectStatus::Completed)
        );

        assert_eq!(ProjectStatus::parse("InProgress"), None);
        assert_eq!(ProjectStatus::parse("in progress"), None);
        assert_eq!(ProjectStatus::parse("Done"), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProjectStatus::New,
            ProjectStatus::InProgress,
            ProjectStatus::Completed,
            ProjectStatus::Paused,
            ProjectStatus::Closed,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn test_update_project_default_is_noop() {
        let update = UpdateProject::default();
        assert!(update.title.is_none());
        assert!(update.developer_ids.is_none());
    }
}
