/// Unified error types for the Krishi Sahayak backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Credential verification failures
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Payment signature verification failures
    #[error("Invalid payment signature: {0}")]
    InvalidSignature(String),

    /// Validation errors (missing or malformed fields)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g., duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream collaborator failures (image host, payment gateway, mail, model)
    #[error("Upstream error: {message}")]
    Upstream {
        status: StatusCode,
        message: String,
    },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Upstream failure with the default 500 status
    pub fn upstream(message: impl Into<String>) -> Self {
        ApiError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Upstream failure relaying a specific status (quota/overload passthrough)
    pub fn upstream_status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Upstream {
            status,
            message: message.into(),
        }
    }
}

/// JSON error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ApiError to HTTP response
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::InvalidCredentials(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidCredentials",
                self.to_string(),
            ),
            ApiError::InvalidSignature(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidSignature",
                self.to_string(),
            ),
            ApiError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                self.to_string(),
            ),
            ApiError::Conflict(_) => (
                StatusCode::BAD_REQUEST,
                "Conflict",
                self.to_string(),
            ),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                "NotFound",
                self.to_string(),
            ),
            ApiError::Upstream { status, ref message } => (
                status,
                "UpstreamError",
                message.clone(),
            ),
            ApiError::Database(_) | ApiError::Internal(_) | ApiError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_and_credential_failures_map_to_400() {
        let conflict = ApiError::Conflict("Email already registered".to_string());
        assert_eq!(conflict.into_response().status(), StatusCode::BAD_REQUEST);

        let creds = ApiError::InvalidCredentials("wrong password".to_string());
        assert_eq!(creds.into_response().status(), StatusCode::BAD_REQUEST);

        let sig = ApiError::InvalidSignature("digest mismatch".to_string());
        assert_eq!(sig.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::NotFound("Account not found".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_relays_status() {
        let err = ApiError::upstream("image host unreachable");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let busy = ApiError::upstream_status(
            StatusCode::TOO_MANY_REQUESTS,
            "model quota exhausted",
        );
        assert_eq!(busy.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::Internal("secret connection string".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
