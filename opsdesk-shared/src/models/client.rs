/// Client records and their listing queries
///
/// Clients are the customer accounts that projects hang off. Client email
/// is unique case-insensitively; a duplicate is reported to the caller as
/// a conflict before the unique index ever fires.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE clients (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     company VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone VARCHAR(50),
///     address TEXT,
///     status TEXT NOT NULL DEFAULT 'New',
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::listing::{like_pattern, PageRequest};

/// Client lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    New,
    Active,
    Paused,
    Closed,
}

impl ClientStatus {
    /// Parses a status string; unknown values yield `None`
    ///
    /// Listing filters use this to silently ignore invalid status values,
    /// so `?status=Bogus` behaves like no status filter at all.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "New" => Some(ClientStatus::New),
            "Active" => Some(ClientStatus::Active),
            "Paused" => Some(ClientStatus::Paused),
            "Closed" => Some(ClientStatus::Closed),
            _ => None,
        }
    }

    /// Status as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::New => "New",
            ClientStatus::Active => "Active",
            ClientStatus::Paused => "Paused",
            ClientStatus::Closed => "Closed",
        }
    }
}

/// Client row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client row with the creating user resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    pub id: Uuid,
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a client
#[derive(Debug, Clone)]
pub struct CreateClient {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub address: String,

    /// Defaults to [`ClientStatus::New`] when absent
    pub status: Option<ClientStatus>,

    /// Acting user
    pub created_by: Uuid,
}

/// Input for a partial client update
///
/// Only non-None fields are applied.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<ClientStatus>,
}

/// Filters for the client listing
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Case-insensitive substring match on name, company, or email
    pub search: Option<String>,

    /// Exact status filter; invalid status strings never reach this field
    pub status: Option<ClientStatus>,
}

const CLIENT_COLUMNS: &str =
    "id, name, company, email, phone, address, status, created_by, created_at, updated_at";

// created_by has no FK; clients outlive the account that created them.
const CLIENT_RECORD_QUERY: &str = r#"
    SELECT c.id, c.name, c.company, c.email, c.phone, c.address, c.status,
           c.created_by, COALESCE(u.name, 'Removed user') AS created_by_name,
           c.created_at, c.updated_at
    FROM clients c
    LEFT JOIN users u ON u.id = c.created_by
"#;

impl Client {
    /// Creates a new client
    pub async fn create(pool: &PgPool, data: CreateClient) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(ClientStatus::New);

        sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (name, company, email, phone, address, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#,
        ))
        .bind(data.name)
        .bind(data.company)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.address)
        .bind(status.as_str())
        .bind(data.created_by)
        .fetch_one(pool)
        .await
    }

    /// Finds a client by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Finds a client by email address (case-insensitive)
    ///
    /// Used for the duplicate-email conflict check on create and update.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Loads a client with its creator resolved
    pub async fn find_record(pool: &PgPool, id: Uuid) -> Result<Option<ClientRecord>, sqlx::Error> {
        sqlx::query_as::<_, ClientRecord>(&format!("{CLIENT_RECORD_QUERY} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists clients newest first
    ///
    /// Returns the page plus the unfiltered and filtered totals; the two
    /// counts and the page query run concurrently.
    pub async fn list(
        pool: &PgPool,
        filter: &ClientFilter,
        page: &PageRequest,
    ) -> Result<(Vec<ClientRecord>, i64, i64), sqlx::Error> {
        let search = filter.search.as_deref().map(like_pattern);
        let status = filter.status.map(|s| s.as_str());

        let total_fut = async {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
                .fetch_one(pool)
                .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let filtered_fut = async {
            let (count,): (i64,) = sqlx::query_as(
                r#"
                SELECT COUNT(*) FROM clients
                WHERE ($1::text IS NULL OR name ILIKE $1 OR company ILIKE $1 OR email ILIKE $1)
                  AND ($2::text IS NULL OR status = $2)
                "#,
            )
            .bind(search.as_deref())
            .bind(status)
            .fetch_one(pool)
            .await?;
            Ok::<_, sqlx::Error>(count)
        };

        let page_fut = async {
            sqlx::query_as::<_, ClientRecord>(&format!(
                r#"
                {CLIENT_RECORD_QUERY}
                WHERE ($1::text IS NULL OR c.name ILIKE $1 OR c.company ILIKE $1 OR c.email ILIKE $1)
                  AND ($2::text IS NULL OR c.status = $2)
                ORDER BY c.created_at DESC
                LIMIT $3 OFFSET $4
                "#,
            ))
            .bind(search.as_deref())
            .bind(status)
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
    /// Returns `None` when no row matches the id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateClient,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE clients SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.company.is_some() {
            bind_count += 1;
            query.push_str(&format!(", company = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {CLIENT_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Client>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(company) = data.company {
            q = q.bind(company);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }

        q.fetch_optional(pool).await
    }

    /// Deletes a client, reporting whether a row existed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts all clients
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clients")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_exact_values_only() {
        assert_eq!(ClientStatus::parse("New"), Some(ClientStatus::New));
        assert_eq!(ClientStatus::parse("Active"), Some(ClientStatus::Active));
        assert_eq!(ClientStatus::parse("Paused"), Some(ClientStatus::Paused));
        assert_eq!(ClientStatus::parse("Closed"), Some(ClientStatus::Closed));

        // Unknown and wrong-case values are rejected so listing filters
        // can silently drop them
        assert_eq!(ClientStatus::parse("active"), None);
        assert_eq!(ClientStatus::parse("Archived"), None);
        assert_eq!(ClientStatus::parse(""), None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ClientStatus::New,
            ClientStatus::Active,
            ClientStatus::Paused,
            ClientStatus::Closed,
        ] {
            assert_eq!(ClientStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_update_client_default_is_noop() {
        let update = UpdateClient::default();
        assert!(update.name.is_none());
        assert!(update.status.is_none());
    }
}
