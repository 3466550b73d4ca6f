/// Liveness endpoint
///
/// `GET /health` answers 200 with `{"status":"ok","database":"up",...}`
/// while the database responds, and 503 with `"degraded"` / `"down"`
/// once it stops. Load balancers key off the status code; the body is
/// for humans.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use opsdesk_shared::db::pool;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_up = pool::ping(&state.db).await.is_ok();

    let (code, status, database) = if db_up {
        (StatusCode::OK, "ok", "up")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
    };

    (
        code,
        Json(HealthResponse {
            status,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
