/// Database plumbing: pool construction and schema migrations
///
/// Query code lives with the entities in the crate-root `models` module;
/// this module only gets a `PgPool` open and the schema current.
///
/// # Example
///
/// ```no_run
/// use opsdesk_shared::db::{migrations, pool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///     let db = pool::connect(&pool::PoolSettings::new(url, 10)).await?;
///     migrations::run(&db).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
