/// Database models for OpsDesk
///
/// Each model module owns its table: the row struct, create/update input
/// structs, the listing filter, and the sqlx operations. Listing queries
/// share the pagination primitives from [`crate::listing`].
///
/// # Modules
///
/// - `user`: Admin and staff accounts, the staff directory
/// - `client`: Client records
/// - `project`: Projects and their assigned-developer sets
/// - `task`: Tasks within projects
/// - `activity_log`: Append-only audit trail

use serde::Serialize;

pub mod activity_log;
pub mod client;
pub mod project;
pub mod task;
pub mod user;

/// One row of a `GROUP BY status` breakdown, used by both dashboards
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
