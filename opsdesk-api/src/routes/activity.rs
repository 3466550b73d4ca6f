/// Activity trail endpoint (admin portal)
///
/// `GET /api/admin/activity` pages through the append-only trail, newest
/// first, with the performer's name and email resolved on each row.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use opsdesk_shared::listing::{PageMeta, PageRequest};
use opsdesk_shared::models::activity_log::{ActivityLog, ActivityRecord};
use serde::{Deserialize, Serialize};

/// Default page size for the activity trail
const DEFAULT_LIMIT: i64 = 10;

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListActivityQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub message: String,
    pub activities: Vec<ActivityRecord>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// List the activity trail
///
/// The trail has no filters, so the unfiltered and filtered totals are
/// the same number.
pub async fn list_activity(
    State(state): State<AppState>,
    Query(query): Query<ListActivityQuery>,
) -> ApiResult<Json<ActivityListResponse>> {
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (activities, total) = ActivityLog::list(&state.db, &page).await?;

    Ok(Json(ActivityListResponse {
        message: "Activity fetched".to_string(),
        activities,
        meta: PageMeta::new(total, total, &page),
    }))
}
