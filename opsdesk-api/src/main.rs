//! # OpsDesk API Server
//!
//! HTTP API for the OpsDesk business-operations portal: clients, projects,
//! tasks, the staff directory, and the activity trail, behind cookie
//! sessions for the admin and staff portals.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p opsdesk-api
//! ```

use opsdesk_api::{app, config::Config};
use opsdesk_shared::db::{migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opsdesk_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "OpsDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::connect(&pool::PoolSettings::new(
        config.database.url.clone(),
        config.database.max_connections,
    ))
    .await?;

    migrations::run(&db).await?;

    let bind_address = config.bind_address();
    let state = app::AppState::new(db, config);
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router).await?;

    Ok(())
}
