//! Error handling for the API server
//!
//! Every handler returns [`ApiResult`]. Errors from the shared crate convert
//! into [`ApiError`] with `?`, and render as a JSON body:
//!
//! ```json
//! { "error": "not_found", "message": "Booking not found" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use easel_shared::auth::authorization::AuthzError;
use easel_shared::auth::jwt::JwtError;
use easel_shared::auth::middleware::AuthError;
use easel_shared::auth::password::PasswordError;
use easel_shared::error::StoreError;
use easel_shared::storage::BlobError;
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

    /// Conflict (409) - duplicate review, profile or email
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503) - no database configured
    ServiceUnavailable(String),
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
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Single-field validation error
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg, None),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Message for a violated constraint, if it is one callers can cause
fn constraint_message(constraint: &str) -> Option<ApiError> {
    match constraint {
        "users_email_key" => Some(ApiError::Conflict("Email already registered".to_string())),
        "artist_profiles_user_id_key" => Some(ApiError::Conflict(
            "Artist profile already exists".to_string(),
        )),
        "reviews_booking_id_key" => Some(ApiError::Conflict(
            "This booking has already been reviewed".to_string(),
        )),
        "categories_name_key" | "categories_slug_key" => {
            Some(ApiError::Conflict("Category already exists".to_string()))
        }
        "bookings_artist_id_fkey" => Some(ApiError::NotFound("Artist not found".to_string())),
        _ => None,
    }
}

/// Convert data-access errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        if let Some(mapped) = err.constraint().and_then(constraint_message) {
            return mapped;
        }

        match err {
            StoreError::Unavailable => {
                ApiError::ServiceUnavailable("Database not available".to_string())
            }
            StoreError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert request authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing authorization header".to_string())
            }
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => {
                ApiError::Unauthorized(msg)
            }
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        let message = err.to_string();
        match err {
            AuthzError::BookingNotFound => ApiError::NotFound(message),
            e if e.is_forbidden() => ApiError::Forbidden(message),
            _ => ApiError::BadRequest(message),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            other => ApiError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

/// Convert blob storage errors to API errors
impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        if err.is_client_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::InternalError(format!("Blob storage error: {}", err))
        }
    }
}

/// Convert `validator` failures to a 422 with per-field details
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_shared::models::booking::BookingStatus;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Booking not found".to_string());
        assert_eq!(err.to_string(), "Not found: Booking not found");
    }

    #[test]
    fn test_authz_taxonomy() {
        assert_eq!(
            ApiError::from(AuthzError::BookingNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AuthzError::NotBookingParty).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthzError::NotBookingClient).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthzError::NotCompleted).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthzError::InvalidTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Declined,
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthzError::AdminRequired).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_review_gate_messages_surface_verbatim() {
        match ApiError::from(AuthzError::NotCompleted) {
            ApiError::BadRequest(msg) => assert_eq!(msg, "Can only review completed bookings"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_store_unavailable_is_503() {
        assert_eq!(
            ApiError::from(StoreError::Unavailable).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_constraint_messages() {
        assert!(matches!(
            constraint_message("reviews_booking_id_key"),
            Some(ApiError::Conflict(msg)) if msg == "This booking has already been reviewed"
        ));
        assert!(matches!(
            constraint_message("bookings_artist_id_fkey"),
            Some(ApiError::NotFound(msg)) if msg == "Artist not found"
        ));
        assert!(constraint_message("some_other_key").is_none());
    }

    #[test]
    fn test_blob_errors() {
        assert_eq!(
            ApiError::from(BlobError::InvalidMimeType("png".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(BlobError::Rejected {
                status: 500,
                body: String::new()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error() {
        let err = ApiError::invalid_field("rating", "Rating must be between 1 and 5");
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
