/// Admin and staff account model
///
/// Users are the admin and staff accounts of the system. Deactivation is a
/// soft switch (`is_active = false`); hard delete also exists and is used
/// by the admin staff directory.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     role TEXT NOT NULL DEFAULT 'staff',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use opsdesk_shared::models::user::{CreateUser, Role, User};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let new_user = CreateUser {
///     name: "Jane Doe".to_string(),
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Staff,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::{like_pattern, PageRequest};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Parses a role string; unknown values yield `None`
    ///
    /// Listing filters use this to silently ignore invalid role values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Role as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

/// User account row
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The hash
/// never leaves the server: wire-facing views of a user go through
/// [`StaffRecord`] or [`StaffRef`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique case-insensitively
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// "admin" or "staff"
    pub role: String,

    /// Deactivated accounts cannot log in or use existing sessions
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Minimal user reference embedded in other payloads
///
/// Used for a project's developer list and for the `allowedStaff`
/// corrective payload on invalid task assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Staff directory row with the derived project count
///
/// `project_count` is computed at read time from developer membership,
/// never stored.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub project_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Aggregate account counts for the staff directory header
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub total_admins: i64,
    pub total_staff: i64,
    pub total_inactive: i64,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    pub role: Role,
}

/// Partial update for a user; `None` fields keep their current value
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// True when no field is set; such an update is a no-op apart from
    /// touching `updated_at`
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

/// Filters for the staff directory listing
#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    /// Case-insensitive substring match on name or email
    pub search: Option<String>,

    /// Exact role filter; invalid role strings never reach this field
    pub role: Option<Role>,

    /// Account state filter: `Some(true)` for active, `Some(false)` for
    /// inactive
    pub is_active: Option<bool>,
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already taken (unique index) or
    /// the database is unreachable. Callers check for duplicates first to
    /// produce a friendly conflict message; the index is the backstop.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role.as_str())
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Applies a partial update; `updated_at` is always touched
    ///
    /// Returns `None` when no row matches the id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // The SET list and the bind list must stay in the same order
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = data.role {
            q = q.bind(role.as_str());
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        q.fetch_optional(pool).await
    }

    /// Hard-deletes a user, reporting whether a row existed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists the staff directory, newest first
    ///
    /// Each row carries `project_count` derived from developer membership.
    /// Returns the page plus the unfiltered and filtered totals; the two
    /// counts and the page query run concurrently.
    pub async fn list_staff(
        pool: &PgPool,
        filter: &StaffFilter,
        page: &PageRequest,
    ) -> Result<(Vec<StaffRecord>, i64, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);
        let role = filter.role.map(|r| r.as_str());

        let total_fut = async {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
                .fetch_one(pool)
                .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let filtered_fut = async {
            let (count,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM users
                WHERE ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)
                  AND ($2::text IS NULL OR role = $2)
                  AND ($3::bool IS NULL OR is_active = $3)
                "#,
            )
            .bind(search.as_deref())
            .bind(role)
            .bind(filter.is_active)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let page_fut = async {
            sqlx::query_as::<_, StaffRecord>(
                r#"
                SELECT u.id, u.name, u.email, u.role, u.is_active, u.created_at,
                       COUNT(pd.project_id) AS project_count
                FROM users u
                LEFT JOIN project_developers pd ON pd.user_id = u.id
                WHERE ($1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1)
                  AND ($2::text IS NULL OR u.role = $2)
                  AND ($3::bool IS NULL OR u.is_active = $3)
                GROUP BY u.id
                ORDER BY u.created_at DESC
                LIMIT $4 OFFSET $5
                "#,
            )
            .bind(search.as_deref())
            .bind(role)
            .bind(filter.is_active)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(pool)
            .await
        };

        let (total, filtered, records) = tokio::try_join!(total_fut, filtered_fut, page_fut)?;

        Ok((records, total, filtered))
    }

    /// Aggregate admin/staff/inactive counts for the directory header
    pub async fn staff_summary(pool: &PgPool) -> Result<StaffSummary, sqlx::Error> {
        sqlx::query_as::<_, StaffSummary>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE role = 'admin') AS total_admins,
                COUNT(*) FILTER (WHERE role = 'staff') AS total_staff,
                COUNT(*) FILTER (WHERE NOT is_active) AS total_inactive
            FROM users
            "#,
        )
        .fetch_one(pool)
        .await
    }

    /// Loads a single staff directory row with its project count
    pub async fn find_staff_record(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<StaffRecord>, sqlx::Error> {
        sqlx::query_as::<_, StaffRecord>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.is_active, u.created_at,
                   COUNT(pd.project_id) AS project_count
            FROM users u
            LEFT JOIN project_developers pd ON pd.user_id = u.id
            WHERE u.id = $1
            GROUP BY u.id
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Strips the password hash for wire-facing payloads
    pub fn to_ref(&self) -> StaffRef {
        StaffRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse("Admin"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Staff] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());

        let update = UpdateUser {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_staff_ref_serializes_camel_case() {
        let r = StaffRef {
            id: Uuid::nil(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
        };

        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("email").is_some());
        assert!(json.get("password_hash").is_none());
    }

    // Integration tests for database operations are in opsdesk-api/tests/
}
