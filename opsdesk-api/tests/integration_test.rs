/// Integration tests for the OpsDesk API
///
/// These tests verify the full system works end-to-end against a real
/// Postgres database:
/// - Session cookies for both portals (login, rejection, expiry)
/// - Client/project/task CRUD with activity logging
/// - The task assignment invariant and its corrective payload
/// - Staff scoping of projects and tasks
/// - Listing pagination metadata
///
/// They need `DATABASE_URL` and `JWT_SECRET` in the environment (or a
/// `.env` file), like the server itself.

mod common;

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use chrono::Duration;
use common::TestContext;
use opsdesk_shared::auth::jwt::{create_token, Claims, SessionAudience};
use serde_json::json;
use tower::Service as _;

/// Admin login sets the adminToken cookie and returns the user sans hash
#[tokio::test]
async fn test_admin_login_sets_session_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": ctx.admin.email,
                "password": common::ADMIN_PASSWORD
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("adminToken="));
    assert!(set_cookie.contains("HttpOnly"));

    let body = common::body_json(response).await;
    assert_eq!(body["user"]["email"], ctx.admin.email);
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("passwordHash").is_none());

    ctx.cleanup().await.unwrap();
}

/// A staff account never opens an admin session, even with the right password
#[tokio::test]
async fn test_staff_credentials_rejected_on_admin_login() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": ctx.staff.email,
                "password": common::STAFF_PASSWORD
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Protected admin routes answer 401 without a session cookie
#[tokio::test]
async fn test_protected_route_requires_session() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/admin/client")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// An expired session token answers 401
#[tokio::test]
async fn test_expired_token_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let claims = Claims::with_expiration(
        ctx.admin.id,
        SessionAudience::Admin,
        Duration::seconds(-3600),
    );
    let token = create_token(&claims, &ctx.config.jwt.secret).unwrap();

    let request = common::get_request("/api/admin/getInfo", &format!("adminToken={}", token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// A staff token on the admin cookie answers 401 (audience mismatch)
#[tokio::test]
async fn test_staff_token_rejected_on_admin_cookie() {
    let ctx = TestContext::new().await.unwrap();

    let claims = Claims::new(ctx.staff.id, SessionAudience::Staff);
    let token = create_token(&claims, &ctx.config.jwt.secret).unwrap();

    let request = common::get_request("/api/admin/getInfo", &format!("adminToken={}", token));
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Client create / duplicate / update / delete, with the activity trail
#[tokio::test]
async fn test_client_crud_with_activity_trail() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    let email = format!("crud-{}@example.com", uuid::Uuid::new_v4());

    // Create
    let request = common::json_request(
        Method::POST,
        "/api/admin/client/add",
        &cookie,
        json!({
            "name": "Acme Contact",
            "company": "Acme Corp",
            "email": email,
            "phone": "555-0101",
            "address": "2 Test Street"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let client_id = body["client"]["id"].as_str().unwrap().to_string();
    // Status defaults to New when absent
    assert_eq!(body["client"]["status"], "New");
    assert_eq!(body["client"]["createdByName"], ctx.admin.name);

    // Duplicate email is a 400, not a constraint blowup
    let request = common::json_request(
        Method::POST,
        "/api/admin/client/add",
        &cookie,
        json!({
            "name": "Other Contact",
            "company": "Other Corp",
            "email": email,
            "phone": "555-0102",
            "address": "3 Test Street"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Partial update leaves untouched fields alone
    let request = common::json_request(
        Method::PUT,
        &format!("/api/admin/client/edit/{}", client_id),
        &cookie,
        json!({ "status": "Paused" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["client"]["status"], "Paused");
    assert_eq!(body["client"]["name"], "Acme Contact");

    // Delete
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/admin/client/delete/{}", client_id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // One trail entry per mutation, surviving the delete
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM activity_logs WHERE performed_by = $1 AND entity_type = 'Client'",
    )
    .bind(ctx.admin.id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 3);

    ctx.cleanup().await.unwrap();
}

/// An unrecognized listing status filter degrades to no filter
#[tokio::test]
async fn test_invalid_status_filter_ignored() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    common::create_test_client(&ctx, "Filter Check").await.unwrap();

    let request = common::get_request("/api/admin/client?status=Bogus", &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    // With the bogus filter dropped, filtered matches the full count
    assert_eq!(body["filtered"], body["total"]);

    ctx.cleanup().await.unwrap();
}

/// Listing metadata stays consistent with the requested limit
#[tokio::test]
async fn test_pagination_metadata() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    for i in 0..3 {
        common::create_test_client(&ctx, &format!("Page Client {}", i))
            .await
            .unwrap();
    }

    let request = common::get_request("/api/admin/client?page=1&limit=2", &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["page"], 1);
    assert!(body["clients"].as_array().unwrap().len() <= 2);

    let filtered = body["filtered"].as_i64().unwrap();
    let total_pages = body["totalPages"].as_i64().unwrap();
    assert!(filtered >= 3);
    assert_eq!(total_pages, (filtered + 1) / 2);

    // A page clamp: page=0 behaves like page=1
    let request = common::get_request("/api/admin/client?page=0&limit=2", &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["page"], 1);

    ctx.cleanup().await.unwrap();
}

/// Task creation enforces the developer-set invariant and returns the
/// corrective allowedStaff payload on violation
#[tokio::test]
async fn test_task_assignment_invariant() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    let client = common::create_test_client(&ctx, "Invariant Client").await.unwrap();
    let project =
        common::create_test_project(&ctx, client.id, "Invariant Project", vec![ctx.staff.id])
            .await
            .unwrap();

    // Admin is not in the developer set
    let request = common::json_request(
        Method::POST,
        "/api/admin/task/add",
        &cookie,
        json!({
            "projectId": project.id,
            "title": "Misassigned task",
            "description": "Should bounce",
            "assignedTo": ctx.admin.id,
            "dueDate": "2026-09-30"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = common::body_json(response).await;
    let allowed = body["allowedStaff"].as_array().expect("allowedStaff list");
    assert_eq!(allowed.len(), 1);
    assert_eq!(allowed[0]["id"], ctx.staff.id.to_string());
    assert_eq!(allowed[0]["email"], ctx.staff.email);

    // The staff developer is a valid assignee; status defaults to Pending
    let request = common::json_request(
        Method::POST,
        "/api/admin/task/add",
        &cookie,
        json!({
            "projectId": project.id,
            "title": "Well-assigned task",
            "description": "Should land",
            "assignedTo": ctx.staff.id,
            "dueDate": "2026-09-30"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    assert_eq!(body["task"]["status"], "Pending");
    assert_eq!(body["task"]["assigneeEmail"], ctx.staff.email);
    assert_eq!(body["task"]["projectTitle"], "Invariant Project");

    ctx.cleanup().await.unwrap();
}

/// Staff only see projects whose developer set includes them, and an
/// out-of-scope id answers 404 exactly like a missing one
#[tokio::test]
async fn test_staff_project_scoping() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.staff_cookie();

    let client = common::create_test_client(&ctx, "Scope Client").await.unwrap();
    let mine = common::create_test_project(&ctx, client.id, "Mine", vec![ctx.staff.id])
        .await
        .unwrap();
    let not_mine = common::create_test_project(&ctx, client.id, "Not Mine", vec![])
        .await
        .unwrap();

    let request = common::get_request("/api/staff/projects", &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let ids: Vec<String> = body["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&mine.id.to_string()));
    assert!(!ids.contains(&not_mine.id.to_string()));

    // Out-of-scope detail view does not leak existence
    let request = common::get_request(&format!("/api/staff/projects/{}", not_mine.id), &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Staff can move their own task's status; the change is logged and an
/// unknown status is rejected
#[tokio::test]
async fn test_staff_task_status_update() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.staff_cookie();

    let client = common::create_test_client(&ctx, "Status Client").await.unwrap();
    let project = common::create_test_project(&ctx, client.id, "Status Project", vec![ctx.staff.id])
        .await
        .unwrap();

    let task = opsdesk_shared::models::task::Task::create(
        &ctx.db,
        opsdesk_shared::models::task::CreateTask {
            project_id: project.id,
            title: "Status task".to_string(),
            description: "Move me".to_string(),
            assigned_to: ctx.staff.id,
            due_date: None,
            status: None,
            created_by: ctx.admin.id,
        },
    )
    .await
    .unwrap();

    // Unknown status is a 400
    let request = common::json_request(
        Method::PUT,
        &format!("/api/staff/tasks/edit/{}", task.id),
        &cookie,
        json!({ "status": "Done" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Valid transition
    let request = common::json_request(
        Method::PUT,
        &format!("/api/staff/tasks/edit/{}", task.id),
        &cookie,
        json!({ "status": "In Progress" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["task"]["status"], "In Progress");

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM activity_logs WHERE performed_by = $1 AND action = 'Task Status Updated'",
    )
    .bind(ctx.staff.id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 1);

    ctx.cleanup().await.unwrap();
}

/// Deactivating an account kills its existing session on the next request
#[tokio::test]
async fn test_deactivated_account_loses_session() {
    let ctx = TestContext::new().await.unwrap();
    let admin_cookie = ctx.admin_cookie();
    let staff_cookie = ctx.staff_cookie();

    // The session works before deactivation
    let request = common::get_request("/api/staff/getInfo", &staff_cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Admin flips the switch
    let request = common::json_request(
        Method::PUT,
        &format!("/api/admin/staff/edit/{}", ctx.staff.id),
        &admin_cookie,
        json!({ "isActive": false }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The still-valid token no longer gets through
    let request = common::get_request("/api/staff/getInfo", &staff_cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Staff self-registration opens a session and writes a trail entry
#[tokio::test]
async fn test_staff_registration_flow() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("newbie-{}@example.com", uuid::Uuid::new_v4());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/staff/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "New Staffer",
                "email": email,
                "password": "a-long-enough-password"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("registration should open a session")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("userToken="));

    let body = common::body_json(response).await;
    assert_eq!(body["user"]["role"], "staff");
    let new_id: uuid::Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();

    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM activity_logs WHERE performed_by = $1 AND action = 'Staff Registered'",
    )
    .bind(new_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();
    assert_eq!(count, 1);

    // Registration fixtures are not covered by ctx.cleanup
    sqlx::query("DELETE FROM activity_logs WHERE performed_by = $1")
        .bind(new_id)
        .execute(&ctx.db)
        .await
        .unwrap();
    opsdesk_shared::models::user::User::delete(&ctx.db, new_id)
        .await
        .unwrap();

    ctx.cleanup().await.unwrap();
}

/// Accounts hard-delete cleanly even after writing trail entries; the
/// entries survive and render with a placeholder performer
#[tokio::test]
async fn test_staff_delete_keeps_activity_trail() {
    let ctx = TestContext::new().await.unwrap();

    // Self-registration writes a "Staff Registered" entry under the new id
    let email = format!("leaver-{}@example.com", uuid::Uuid::new_v4());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/staff/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "name": "Short Tenure",
                "email": email,
                "password": "a-long-enough-password"
            })
            .to_string(),
        ))
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    let new_id: uuid::Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();

    // The hard delete goes through despite the entry pointing at the account
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/admin/staff/delete/{}", new_id))
        .header(header::COOKIE, ctx.admin_cookie())
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::get_request(&format!("/api/admin/staff/{}", new_id), &ctx.admin_cookie());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The registration entry outlives the account
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM activity_logs WHERE performed_by = $1")
            .bind(new_id)
            .fetch_one(&ctx.db)
            .await
            .unwrap();
    assert_eq!(count, 1);

    // And the trail still renders it, with the performer replaced
    let request = common::get_request("/api/admin/activity?limit=100", &ctx.admin_cookie());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    let orphan = body["activities"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["performedBy"] == new_id.to_string())
        .expect("entry by the deleted account");
    assert_eq!(orphan["performerName"], "Removed user");
    assert_eq!(orphan["performerEmail"], "");

    sqlx::query("DELETE FROM activity_logs WHERE performed_by = $1")
        .bind(new_id)
        .execute(&ctx.db)
        .await
        .unwrap();

    ctx.cleanup().await.unwrap();
}

/// Deleting a client takes its projects and their tasks with it
#[tokio::test]
async fn test_client_delete_cascades_projects_and_tasks() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    let client = common::create_test_client(&ctx, "Cascade Client").await.unwrap();
    let project =
        common::create_test_project(&ctx, client.id, "Cascade Project", vec![ctx.staff.id])
            .await
            .unwrap();
    let task = opsdesk_shared::models::task::Task::create(
        &ctx.db,
        opsdesk_shared::models::task::CreateTask {
            project_id: project.id,
            title: "Cascade task".to_string(),
            description: "Goes with the project".to_string(),
            assigned_to: ctx.staff.id,
            due_date: None,
            status: None,
            created_by: ctx.admin.id,
        },
    )
    .await
    .unwrap();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/admin/client/delete/{}", client.id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::get_request(&format!("/api/admin/project/{}", project.id), &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE id = $1")
        .bind(task.id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 0);

    ctx.cleanup().await.unwrap();
}

/// The staff directory status filter splits active from inactive accounts
#[tokio::test]
async fn test_staff_status_filter() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    // The context's staff account starts active; search by its unique email
    let active_uri = format!("/api/admin/staff?search={}&status=active", ctx.staff.email);
    let inactive_uri = format!("/api/admin/staff?search={}&status=inactive", ctx.staff.email);

    let request = common::get_request(&active_uri, &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["staff"].as_array().unwrap().len(), 1);

    let request = common::get_request(&inactive_uri, &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert!(body["staff"].as_array().unwrap().is_empty());

    // Deactivate and the account moves to the other side of the filter
    let request = common::json_request(
        Method::PUT,
        &format!("/api/admin/staff/edit/{}", ctx.staff.id),
        &cookie,
        json!({ "isActive": false }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = common::get_request(&active_uri, &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert!(body["staff"].as_array().unwrap().is_empty());

    let request = common::get_request(&inactive_uri, &cookie);
    let response = ctx.app.clone().call(request).await.unwrap();
    let body = common::body_json(response).await;
    assert_eq!(body["staff"].as_array().unwrap().len(), 1);
    assert_eq!(body["staff"][0]["isActive"], false);

    ctx.cleanup().await.unwrap();
}

/// A page past the end answers 200 with an empty slice and intact metadata
#[tokio::test]
async fn test_page_beyond_end_returns_empty() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    let marker = format!("Tail-{}", uuid::Uuid::new_v4());
    common::create_test_client(&ctx, &marker).await.unwrap();

    let request = common::get_request(
        &format!("/api/admin/client?search={}&page=9&limit=2", marker),
        &cookie,
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["clients"].as_array().unwrap().is_empty());
    assert_eq!(body["filtered"], 1);
    assert_eq!(body["page"], 9);
    assert_eq!(body["totalPages"], 1);

    ctx.cleanup().await.unwrap();
}

/// Project creation requires an explicit, recognized status
#[tokio::test]
async fn test_project_create_requires_status() {
    let ctx = TestContext::new().await.unwrap();
    let cookie = ctx.admin_cookie();

    let client = common::create_test_client(&ctx, "Status Required").await.unwrap();

    // A blank status bounces
    let request = common::json_request(
        Method::POST,
        "/api/admin/project/add",
        &cookie,
        json!({
            "clientId": client.id,
            "title": "No status",
            "description": "Should bounce",
            "timeline": {},
            "assignedDevelopers": [ctx.staff.id],
            "status": ""
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An unknown status bounces too
    let request = common::json_request(
        Method::POST,
        "/api/admin/project/add",
        &cookie,
        json!({
            "clientId": client.id,
            "title": "Bad status",
            "description": "Should bounce",
            "timeline": {},
            "assignedDevelopers": [ctx.staff.id],
            "status": "Bogus"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // An explicit status lands and is stored as given
    let request = common::json_request(
        Method::POST,
        "/api/admin/project/add",
        &cookie,
        json!({
            "clientId": client.id,
            "title": "Stated status",
            "description": "Should land",
            "timeline": {},
            "assignedDevelopers": [ctx.staff.id],
            "status": "In Progress"
        }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = common::body_json(response).await;
    assert_eq!(body["project"]["status"], "In Progress");

    ctx.cleanup().await.unwrap();
}

/// The admin dashboard aggregates and the staff dashboard scopes
#[tokio::test]
async fn test_dashboards() {
    let ctx = TestContext::new().await.unwrap();

    let client = common::create_test_client(&ctx, "Dash Client").await.unwrap();
    common::create_test_project(&ctx, client.id, "Dash Project", vec![ctx.staff.id])
        .await
        .unwrap();

    let request = common::get_request("/api/admin/dashboard", &ctx.admin_cookie());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert!(body["totalClients"].as_i64().unwrap() >= 1);
    assert!(body["totalProjects"].as_i64().unwrap() >= 1);
    assert!(body["projectStatusBreakdown"].is_array());
    assert!(body["recentActivity"].is_array());

    let request = common::get_request("/api/staff/dashboard", &ctx.staff_cookie());
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_json(response).await;
    assert_eq!(body["assignedProjects"], 1);
    assert!(body["recentTasks"].as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}
