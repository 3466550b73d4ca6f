/// PostgreSQL pool construction
///
/// The API is a small always-on server, so the pool is sized from a
/// single knob (`max_connections`) and the rest of the tuning is fixed:
/// a short acquire timeout so a saturated pool surfaces quickly, idle
/// connections recycled after ten minutes, and a hard connection
/// lifetime of thirty minutes.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Pool sizing
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// PostgreSQL connection URL
    pub url: String,

    /// Upper bound on open connections
    pub max_connections: u32,
}

impl PoolSettings {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
        }
    }
}

/// Opens the connection pool and verifies the database answers
///
/// The ping runs at startup so a bad `DATABASE_URL` fails the boot
/// instead of the first request.
///
/// # Errors
///
/// Returns an error if the URL is malformed, the server is unreachable,
/// or the ping query fails.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    info!(
        max_connections = settings.max_connections,
        "Opening database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&settings.url)
        .await?;

    ping(&pool).await?;

    info!("Database pool ready");
    Ok(pool)
}

/// Round-trips a trivial query to confirm the database is responding
///
/// # Errors
///
/// Returns the underlying sqlx error if the query cannot complete.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    debug!("Database ping ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_url_and_size() {
        let settings = PoolSettings::new("postgresql://localhost/opsdesk", 8);
        assert_eq!(settings.url, "postgresql://localhost/opsdesk");
        assert_eq!(settings.max_connections, 8);
    }

    // Connection behavior is covered by the API integration tests,
    // which need a running database anyway.
}
