/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `ApiResult<T>` which automatically converts to the
/// appropriate HTTP status codes.
///
/// The client contract collapses most failures into 400: duplicate emails
/// (`Conflict`) and field validation failures both respond with 400, with
/// the distinction carried in the `error` code and body shape rather than
/// the status line. Invalid task assignment is its own kind because its
/// body carries the corrective `allowedStaff` list.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opsdesk_shared::models::user::StaffRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Duplicate email or similar uniqueness violation (400)
    Conflict(String),

    /// Field validation failed (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Task assignee outside the project's developer set (400)
    ///
    /// Carries the set of valid assignees so the client can correct the
    /// form without a second round trip.
    InvalidAssignment {
        message: String,
        allowed_staff: Vec<StaffRef>,
    },

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,

    /// Valid assignees, present only on invalid task assignment
    #[serde(rename = "allowedStaff", skip_serializing_if = "Option::is_none")]
    pub allowed_staff: Option<Vec<StaffRef>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InvalidAssignment { message, .. } => {
                write!(f, "Invalid assignment: {}", message)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details, allowed_staff) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None, None),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg, None, None)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None, None),
            // Conflicts respond 400, not 409: the SPA treats them as form
            // errors alongside validation failures
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, "conflict", msg, None, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
                None,
            ),
            ApiError::InvalidAssignment {
                message,
                allowed_staff,
            } => (
                StatusCode::BAD_REQUEST,
                "invalid_assignment",
                message,
                None,
                Some(allowed_staff),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
            allowed_staff,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique index violations surface as conflicts; handlers
                // usually pre-check, the index is the backstop
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<opsdesk_shared::auth::password::PasswordError> for ApiError {
    fn from(err: opsdesk_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert session token errors to API errors
impl From<opsdesk_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: opsdesk_shared::auth::jwt::JwtError) -> Self {
        match err {
            opsdesk_shared::auth::jwt::JwtError::Expired => {
                ApiError::Unauthorized("Session expired".to_string())
            }
            opsdesk_shared::auth::jwt::JwtError::WrongAudience { .. } => {
                ApiError::Unauthorized("Invalid session".to_string())
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Maps validator failures into the shared validation error shape
///
/// Shared by every handler that validates a request DTO.
pub fn validation_error(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    ApiError::ValidationError(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Client not found".to_string());
        assert_eq!(err.to_string(), "Not found: Client not found");
    }

    #[test]
    fn test_conflict_maps_to_400() {
        let response = ApiError::Conflict("Email already exists".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_assignment_carries_allowed_staff() {
        let err = ApiError::InvalidAssignment {
            message: "Assignee is not on this project".to_string(),
            allowed_staff: vec![StaffRef {
                id: Uuid::new_v4(),
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
            }],
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_omits_empty_fields() {
        let body = ErrorResponse {
            error: "bad_request".to_string(),
            message: "nope".to_string(),
            details: None,
            allowed_staff: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("allowedStaff").is_none());
    }
}
