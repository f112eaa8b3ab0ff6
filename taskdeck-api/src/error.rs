/// Error handling for the API server
///
/// Provides a unified error type that maps to HTTP responses. Handlers
/// return `Result<T, ApiError>` which converts automatically to the right
/// status code; domain errors from `taskdeck_shared` flow in via `From`.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskdeck_shared::auth::authorization::AuthzError;
use taskdeck_shared::auth::jwt::JwtError;
use taskdeck_shared::error::CoreError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401) - missing or invalid token
    Unauthorized(String),

    /// Forbidden (403) - authorization failed
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409)
    Conflict(String),

    /// Unprocessable entity (422) - validation and domain-rule failures
    ValidationError(Vec<ValidationErrorDetail>),

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
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// A 422 for a single-field domain-rule failure
    fn unprocessable(field: &str, message: String) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message,
        }])
    }
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
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert core domain errors to API errors
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ApiError::unprocessable("request", msg),
            CoreError::Unauthorized(msg) => ApiError::Forbidden(msg),
            CoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            CoreError::DuplicateIdentifier(id) => ApiError::unprocessable(
                "identifier",
                format!("column identifier '{}' already exists", id),
            ),
            CoreError::ProtectedColumn(id) => ApiError::unprocessable(
                "identifier",
                format!("column '{}' is built in and cannot be deleted", id),
            ),
            CoreError::InvalidColumn(status) => ApiError::unprocessable(
                "status",
                format!("'{}' is not a column of this project", status),
            ),
            CoreError::InvalidAssignee => ApiError::unprocessable(
                "assignee_id",
                "assignee must be a member of the project".to_string(),
            ),
            CoreError::AlreadyMember => ApiError::unprocessable(
                "email",
                "user is already a member of this project".to_string(),
            ),
            CoreError::NotProjectMember => ApiError::unprocessable(
                "user_id",
                "user is not a member of this project".to_string(),
            ),
            CoreError::SelfRemovalForbidden => {
                ApiError::BadRequest("you cannot remove yourself from a project".to_string())
            }
            CoreError::Conflict(msg) => ApiError::unprocessable("position", msg),
            CoreError::Database(err) => ApiError::from(err),
        }
    }
}

/// Convert request-body validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<ValidationErrorDetail> = err
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
}

/// Maps a violated constraint to the same error the in-transaction check
/// produces, so a raced insert and a detected duplicate look identical to
/// clients
fn constraint_violation(constraint: &str) -> ApiError {
    match constraint {
        "board_columns_project_id_identifier_key" => ApiError::unprocessable(
            "identifier",
            "column identifier already exists for this project".to_string(),
        ),
        "board_columns_project_id_position_key" => ApiError::unprocessable(
            "position",
            "column position is already taken".to_string(),
        ),
        "project_members_pkey" => ApiError::unprocessable(
            "email",
            "user is already a member of this project".to_string(),
        ),
        _ => ApiError::Conflict(format!("Constraint violation: {}", constraint)),
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    return constraint_violation(constraint);
                }

                // Other database errors are internal
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotMember(_) => {
                ApiError::Forbidden("Not a member of this project".to_string())
            }
            AuthzError::InsufficientRole { .. } => {
                ApiError::Forbidden("Insufficient permissions".to_string())
            }
            AuthzError::Database(err) => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("project not found".to_string());
        assert_eq!(err.to_string(), "Not found: project not found");
    }

    #[test]
    fn test_core_error_mapping() {
        let err = ApiError::from(CoreError::SelfRemovalForbidden);
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = ApiError::from(CoreError::NotFound("project"));
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = ApiError::from(CoreError::InvalidColumn("review".to_string()));
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err = ApiError::from(CoreError::Unauthorized("nope".to_string()));
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_raced_unique_violations_stay_422() {
        // A duplicate caught by the database instead of the in-transaction
        // check must produce the same response shape
        let err = constraint_violation("board_columns_project_id_identifier_key");
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err = constraint_violation("board_columns_project_id_position_key");
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err = constraint_violation("project_members_pkey");
        assert!(matches!(err, ApiError::ValidationError(_)));

        // Unknown constraints keep the generic conflict mapping
        let err = constraint_violation("users_email_key");
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "title".to_string(),
                message: "Title is required".to_string(),
            },
            ValidationErrorDetail {
                field: "end_date".to_string(),
                message: "End date must be after start date".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
