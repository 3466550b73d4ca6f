/// Append-only activity log
///
/// Every successful mutation of a client, project, task, or user writes
/// one activity row describing who did what. The trail is best-effort by
/// design: [`ActivityLog::record_best_effort`] logs a warning on failure
/// and never lets an audit problem fail the mutation it describes.
///
/// There is no update or delete path for activity rows anywhere in the
/// codebase. Neither `entity_id` nor `performed_by` carries a foreign key,
/// so entries survive the deletion of the entity they describe and of the
/// account that performed the action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::PageRequest;

/// Activity log row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: String,
    pub performed_by: Uuid,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// Activity row with the performer resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: Uuid,
    pub action: String,
    pub performed_by: Uuid,
    pub performer_name: String,
    pub performer_email: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

/// One entry to append
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// Human-readable action, e.g. "Client Added", "Task Status Updated"
    pub action: String,

    /// Acting user
    pub performed_by: Uuid,

    /// Entity kind: "Client", "Project", "Task", or "User"
    pub entity_type: String,

    /// Id of the affected entity; kept even after the entity is deleted
    pub entity_id: Option<Uuid>,

    /// Free-form context, e.g. the old and new status
    pub details: String,
}

impl NewActivity {
    pub fn new(
        action: impl Into<String>,
        performed_by: Uuid,
        entity_type: impl Into<String>,
        entity_id: Uuid,
        details: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            performed_by,
            entity_type: entity_type.into(),
            entity_id: Some(entity_id),
            details: details.into(),
        }
    }
}

// performed_by has no FK; entries by deleted accounts still list, with a
// placeholder performer name.
const ACTIVITY_RECORD_QUERY: &str = r#"
    SELECT a.id, a.action, a.performed_by,
           COALESCE(u.name, 'Removed user') AS performer_name,
           COALESCE(u.email, '') AS performer_email,
           a.entity_type, a.entity_id, a.details, a.created_at
    FROM activity_logs a
    LEFT JOIN users u ON u.id = a.performed_by
"#;

impl ActivityLog {
    /// Appends one activity row
    pub async fn record(pool: &PgPool, entry: NewActivity) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (action, performed_by, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, action, performed_by, entity_type, entity_id, details, created_at
            "#,
        )
        .bind(entry.action)
        .bind(entry.performed_by)
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.details)
        .fetch_one(pool)
        .await
    }

    /// Appends one activity row, swallowing failures
    ///
    /// The mutation this entry describes has already succeeded; a failed
    /// audit write must not turn it into an error response. The failure is
    /// still visible in the logs.
    pub async fn record_best_effort(pool: &PgPool, entry: NewActivity) {
        let action = entry.action.clone();
        if let Err(e) = Self::record(pool, entry).await {
            tracing::warn!(action = %action, error = %e, "Failed to write activity log entry");
        }
    }

    /// Lists activity newest first with the performer resolved
    ///
    /// Returns the page plus the total count; both queries run
    /// concurrently.
    pub async fn list(
        pool: &PgPool,
        page: &PageRequest,
    ) -> Result<(Vec<ActivityRecord>, i64), sqlx::Error> {
        let total_fut = async {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activity_logs")
                .fetch_one(pool)
                .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let page_fut = async {
            sqlx::query_as::<_, ActivityRecord>(&format!(
                r#"
                {ACTIVITY_RECORD_QUERY}
                ORDER BY a.created_at DESC
                LIMIT $1 OFFSET $2
                "#,
            ))
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
        };

        let (total, records) = tokio::try_join!(total_fut, page_fut)?;

        Ok((records, total))
    }

    /// The most recent activity entries, for the admin dashboard
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<ActivityRecord>, sqlx::Error> {
        sqlx::query_as::<_, ActivityRecord>(&format!(
            r#"
            {ACTIVITY_RECORD_QUERY}
            ORDER BY a.created_at DESC
            LIMIT $1
            "#,
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// The most recent entries performed by one user, for the staff
    /// dashboard
    pub async fn recent_for_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<ActivityRecord>, sqlx::Error> {
        sqlx::query_as::<_, ActivityRecord>(&format!(
            r#"
            {ACTIVITY_RECORD_QUERY}
            WHERE a.performed_by = $1
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_activity_builder() {
        let user = Uuid::new_v4();
        let entity = Uuid::new_v4();

        let entry = NewActivity::new("Client Added", user, "Client", entity, "Acme Corp");

        assert_eq!(entry.action, "Client Added");
        assert_eq!(entry.performed_by, user);
        assert_eq!(entry.entity_type, "Client");
        assert_eq!(entry.entity_id, Some(entity));
        assert_eq!(entry.details, "Acme Corp");
    }
}
