/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test admin/staff account creation
/// - Session cookie generation
/// - Request and fixture helpers
///
/// Tests share one database, so every fixture is scoped to accounts
/// created here and cleanup only removes rows those accounts produced.

use axum::body::Body;
use axum::http::{header, Method, Request};
use opsdesk_api::app::{build_router, AppState};
use opsdesk_api::config::Config;
use opsdesk_shared::auth::jwt::{create_token, Claims, SessionAudience};
use opsdesk_shared::auth::password;
use opsdesk_shared::models::client::{Client, ClientStatus, CreateClient};
use opsdesk_shared::models::project::{CreateProject, Project};
use opsdesk_shared::models::user::{CreateUser, Role, User};
use sqlx::PgPool;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "admin-password-123";
pub const STAFF_PASSWORD: &str = "staff-password-123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub admin: User,
    pub staff: User,
}

impl TestContext {
    /// Creates a new test context with fresh admin and staff accounts
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../opsdesk-shared/migrations").run(&db).await?;

        let admin = User::create(
            &db,
            CreateUser {
                name: "Test Admin".to_string(),
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(ADMIN_PASSWORD)?,
                role: Role::Admin,
            },
        )
        .await?;

        let staff = User::create(
            &db,
            CreateUser {
                name: "Test Staff".to_string(),
                email: format!("staff-{}@example.com", Uuid::new_v4()),
                password_hash: password::hash_password(STAFF_PASSWORD)?,
                role: Role::Staff,
            },
        )
        .await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            admin,
            staff,
        })
    }

    /// Cookie header value for an admin session
    pub fn admin_cookie(&self) -> String {
        self.cookie_for(self.admin.id, SessionAudience::Admin)
    }

    /// Cookie header value for a staff session
    pub fn staff_cookie(&self) -> String {
        self.cookie_for(self.staff.id, SessionAudience::Staff)
    }

    /// Builds a session cookie for an arbitrary user and namespace
    pub fn cookie_for(&self, user_id: Uuid, audience: SessionAudience) -> String {
        let claims = Claims::new(user_id, audience);
        let token = create_token(&claims, &self.config.jwt.secret).expect("Should create token");
        format!("{}={}", audience.cookie_name(), token)
    }

    /// Cleans up everything the test accounts created
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let ids = [self.admin.id, self.staff.id];

        // Children before parents; project_developers cascades with projects
        sqlx::query("DELETE FROM activity_logs WHERE performed_by = ANY($1)")
            .bind(&ids[..])
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE created_by = ANY($1) OR assigned_to = ANY($1)")
            .bind(&ids[..])
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM projects WHERE created_by = ANY($1)")
            .bind(&ids[..])
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM clients WHERE created_by = ANY($1)")
            .bind(&ids[..])
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&ids[..])
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Builds a JSON request carrying a session cookie
pub fn json_request(
    method: Method,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a bodyless request carrying a session cookie
pub fn get_request(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper to create a test client owned by the context's admin
pub async fn create_test_client(ctx: &TestContext, name: &str) -> anyhow::Result<Client> {
    let client = Client::create(
        &ctx.db,
        CreateClient {
            name: name.to_string(),
            company: format!("{} Inc", name),
            email: format!("client-{}@example.com", Uuid::new_v4()),
            phone: "555-0100".to_string(),
            address: "1 Test Street".to_string(),
            status: Some(ClientStatus::Active),
            created_by: ctx.admin.id,
        },
    )
    .await?;

    Ok(client)
}

/// Helper to create a test project with the given developer set
pub async fn create_test_project(
    ctx: &TestContext,
    client_id: Uuid,
    title: &str,
    developer_ids: Vec<Uuid>,
) -> anyhow::Result<Project> {
    let project = Project::create(
        &ctx.db,
        CreateProject {
            client_id,
            title: title.to_string(),
            description: "Test project".to_string(),
            start_date: None,
            end_date: None,
            status: None,
            developer_ids,
            created_by: ctx.admin.id,
        },
    )
    .await?;

    Ok(project)
}
