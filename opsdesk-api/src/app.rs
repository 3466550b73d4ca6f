/// Router assembly and shared state
///
/// Wires every route group to its handlers, hangs the session middleware
/// on the two protected groups, and stacks the cross-cutting layers
/// (tracing, CORS, hardening headers) on the outside.
///
/// # Example
///
/// ```no_run
/// use opsdesk_api::{app, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let db = PgPool::connect(&config.database.url).await?;
/// let router = app::build_router(app::AppState::new(db, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::{ApiConfig, Config},
    middleware::security::security_headers,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use opsdesk_shared::auth::middleware::{require_admin_session, require_staff_session};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// State handed to every handler via the `State` extractor
///
/// The pool is internally reference-counted and the config sits behind
/// an `Arc`, so the per-request clone is two pointer bumps.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Session token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Whether session cookies carry Secure + SameSite=None
    pub fn cookie_secure(&self) -> bool {
        self.config.api.cookie_secure
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// └── /api/
///     ├── /admin/                   # Admin portal (adminToken cookie)
///     │   ├── POST /login           # public
///     │   ├── POST /logout          # public (clears cookie)
///     │   ├── GET  /getInfo
///     │   ├── /staff/…              # staff directory CRUD
///     │   ├── /client/…             # client CRUD
///     │   ├── /project/…            # project CRUD
///     │   ├── /task/…               # task CRUD
///     │   ├── GET  /activity
///     │   └── GET  /dashboard
///     └── /staff/                   # Staff portal (userToken cookie)
///         ├── POST /register        # public
///         ├── POST /login           # public
///         ├── POST /logout          # public (clears cookie)
///         ├── GET  /getInfo
///         ├── /projects/…           # own projects (read + status edit)
///         ├── /tasks/…              # own tasks (read + status edit)
///         └── GET  /dashboard
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, credentials allowed for cookies)
/// 3. Security headers
/// 4. Session authentication (per-portal layers)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Admin session endpoints that must work without a session
    let admin_public = Router::new()
        .route("/login", post(routes::admin_auth::login))
        .route("/logout", post(routes::admin_auth::logout));

    // Everything else under /api/admin requires the adminToken session
    let admin_protected = Router::new()
        .route("/getInfo", get(routes::admin_auth::get_info))
        .route("/staff", get(routes::staff_directory::list_staff))
        .route("/staff/add", post(routes::staff_directory::add_staff))
        .route("/staff/:id", get(routes::staff_directory::get_staff))
        .route("/staff/edit/:id", put(routes::staff_directory::edit_staff))
        .route(
            "/staff/delete/:id",
            delete(routes::staff_directory::delete_staff),
        )
        .route("/client/add", post(routes::clients::add_client))
        .route("/client", get(routes::clients::list_clients))
        .route("/client/:id", get(routes::clients::get_client))
        .route("/client/edit/:id", put(routes::clients::edit_client))
        .route("/client/delete/:id", delete(routes::clients::delete_client))
        .route("/project/add", post(routes::projects::add_project))
        .route("/project", get(routes::projects::list_projects))
        .route("/project/:id", get(routes::projects::get_project))
        .route("/project/edit/:id", put(routes::projects::edit_project))
        .route(
            "/project/delete/:id",
            delete(routes::projects::delete_project),
        )
        .route("/task/add", post(routes::tasks::add_task))
        .route("/task", get(routes::tasks::list_tasks))
        .route("/task/:id", get(routes::tasks::get_task))
        .route("/task/edit/:id", put(routes::tasks::edit_task))
        .route("/task/delete/:id", delete(routes::tasks::delete_task))
        .route("/activity", get(routes::activity::list_activity))
        .route("/dashboard", get(routes::dashboard::admin_dashboard))
        .layer(axum::middleware::from_fn(require_admin_session(
            state.db.clone(),
            state.jwt_secret().to_string(),
        )));

    let admin_routes = admin_public.merge(admin_protected);

    // Staff session endpoints that must work without a session
    let staff_public = Router::new()
        .route("/register", post(routes::staff_auth::register))
        .route("/login", post(routes::staff_auth::login))
        .route("/logout", post(routes::staff_auth::logout));

    // Everything else under /api/staff requires the userToken session
    let staff_protected = Router::new()
        .route("/getInfo", get(routes::staff_auth::get_info))
        .route("/projects", get(routes::staff_projects::list_projects))
        .route("/projects/:id", get(routes::staff_projects::get_project))
        .route(
            "/projects/edit/:id",
            put(routes::staff_projects::update_status),
        )
        .route("/tasks", get(routes::staff_tasks::list_tasks))
        .route("/tasks/:id", get(routes::staff_tasks::get_task))
        .route("/tasks/edit/:id", put(routes::staff_tasks::update_status))
        .route("/dashboard", get(routes::dashboard::staff_dashboard))
        .layer(axum::middleware::from_fn(require_staff_session(
            state.db.clone(),
            state.jwt_secret().to_string(),
        )));

    let staff_routes = staff_public.merge(staff_protected);

    let api_routes = Router::new()
        .nest("/admin", admin_routes)
        .nest("/staff", staff_routes);

    let cors = cors_layer(&state.config.api);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn(security_headers(
            state.config.api.cookie_secure,
        )))
        .with_state(state)
}

/// CORS policy for the configured origins
///
/// A `*` entry means development and gets the permissive layer. Anything
/// else is an explicit origin list with credentials enabled, which the
/// session cookies need to travel cross-origin.
fn cors_layer(api: &ApiConfig) -> CorsLayer {
    if api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
