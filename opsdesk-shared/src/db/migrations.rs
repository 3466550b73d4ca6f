/// Embedded, forward-only schema migrations
///
/// The SQL files under this crate's `migrations/` directory are compiled
/// into the binary with `sqlx::migrate!` and applied at server startup.
/// There is no down path; a schema mistake gets a new forward migration.

use sqlx::{migrate::MigrateDatabase, postgres::PgPool, Postgres};
use tracing::{error, info};

/// Applies any migrations the database has not seen yet
///
/// # Errors
///
/// Returns an error if a migration file is malformed, a statement fails,
/// or the connection drops mid-run. The failing migration is logged
/// before the error propagates.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Applying schema migrations");

    if let Err(e) = sqlx::migrate!("./migrations").run(pool).await {
        error!(error = %e, "Schema migration failed");
        return Err(e);
    }

    info!("Schema up to date");
    Ok(())
}

/// Creates the target database when it is missing
///
/// A convenience for local development and CI databases; production
/// schemas are provisioned out of band.
///
/// # Errors
///
/// Returns an error if the server is unreachable or the role lacks
/// CREATEDB.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), sqlx::Error> {
    if Postgres::database_exists(database_url).await? {
        return Ok(());
    }

    info!("Database missing, creating it");
    Postgres::create_database(database_url).await
}
