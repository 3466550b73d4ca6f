/// Client CRUD endpoints (admin portal)
///
/// # Endpoints
///
/// - `POST /api/admin/client/add` - Create a client
/// - `GET /api/admin/client` - List clients (search, status, pagination)
/// - `GET /api/admin/client/:id` - Fetch one client
/// - `PUT /api/admin/client/edit/:id` - Partial update
/// - `DELETE /api/admin/client/delete/:id` - Delete
///
/// Listing accepts `?search=`, `?status=`, `?page=`, `?limit=`. An
/// unrecognized status value is silently ignored rather than rejected, so
/// the listing degrades to unfiltered instead of erroring.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use opsdesk_shared::listing::{PageMeta, PageRequest};
use opsdesk_shared::models::activity_log::{ActivityLog, NewActivity};
use opsdesk_shared::models::client::{
    Client, ClientFilter, ClientRecord, ClientStatus, CreateClient, UpdateClient,
};
use opsdesk_shared::auth::middleware::CurrentUser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for client listings
const DEFAULT_LIMIT: i64 = 6;

/// Create client request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Company is required"))]
    pub company: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 50, message = "Phone is required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    /// Optional; defaults to "New"
    pub status: Option<String>,
}

/// Partial update request; only present fields are applied
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Company cannot be empty"))]
    pub company: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

/// Listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Listing response
#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub message: String,
    pub clients: Vec<ClientRecord>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Single-client response
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub message: String,
    pub client: ClientRecord,
}

fn parse_status(value: &str) -> ApiResult<ClientStatus> {
    ClientStatus::parse(value)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid client status: {}", value)))
}

/// Create a client
///
/// Responds 201 with the stored record.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, invalid status, or duplicate email
pub async fn add_client(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    req.validate().map_err(validation_error)?;

    // Mutations reject unknown statuses; only listings ignore them
    let status = req.status.as_deref().map(parse_status).transpose()?;

    if Client::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::Conflict(
            "A client with this email already exists".to_string(),
        ));
    }

    let client = Client::create(
        &state.db,
        CreateClient {
            name: req.name,
            company: req.company,
            email: req.email,
            phone: req.phone,
            address: req.address,
            status,
            created_by: user.id,
        },
    )
    .await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Client Added",
            user.id,
            "Client",
            client.id,
            format!("{} ({})", client.name, client.company),
        ),
    )
    .await;

    let record = Client::find_record(&state.db, client.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Created client not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ClientResponse {
            message: "Client added".to_string(),
            client: record,
        }),
    ))
}

/// List clients
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListClientsQuery>,
) -> ApiResult<Json<ClientListResponse>> {
    let filter = ClientFilter {
        search: query.search,
        // Unknown status values silently fall back to no filter
        status: query.status.as_deref().and_then(ClientStatus::parse),
    };
    let page = PageRequest::new(query.page, query.limit, DEFAULT_LIMIT);

    let (clients, total, filtered) = Client::list(&state.db, &filter, &page).await?;

    Ok(Json(ClientListResponse {
        message: "Clients fetched".to_string(),
        clients,
        meta: PageMeta::new(total, filtered, &page),
    }))
}

/// Fetch one client
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClientResponse>> {
    let record = Client::find_record(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(ClientResponse {
        message: "Client fetched".to_string(),
        client: record,
    }))
}

/// Partially update a client
///
/// Only fields present in the payload change; everything else is left
/// untouched.
pub async fn edit_client(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    req.validate().map_err(validation_error)?;

    let status = req.status.as_deref().map(parse_status).transpose()?;

    // Email changes must not collide with another client
    if let Some(ref email) = req.email {
        if let Some(existing) = Client::find_by_email(&state.db, email).await? {
            if existing.id != id {
                return Err(ApiError::Conflict(
                    "A client with this email already exists".to_string(),
                ));
            }
        }
    }

    let client = Client::update(
        &state.db,
        id,
        UpdateClient {
            name: req.name,
            company: req.company,
            email: req.email,
            phone: req.phone,
            address: req.address,
            status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Client Updated",
            user.id,
            "Client",
            client.id,
            format!("{} ({})", client.name, client.company),
        ),
    )
    .await;

    let record = Client::find_record(&state.db, client.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(ClientResponse {
        message: "Client updated".to_string(),
        client: record,
    }))
}

/// Delete a client
///
/// The client is loaded first so the activity entry can carry a snapshot
/// of what was deleted.
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<super::admin_auth::MessageResponse>> {
    let client = Client::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Client::delete(&state.db, id).await?;

    ActivityLog::record_best_effort(
        &state.db,
        NewActivity::new(
            "Client Deleted",
            user.id,
            "Client",
            client.id,
            format!("{} ({})", client.name, client.company),
        ),
    )
    .await;

    Ok(Json(super::admin_auth::MessageResponse {
        message: "Client deleted".to_string(),
    }))
}
