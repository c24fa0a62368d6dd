/**
 * Backend Error Types
 *
 * This module defines error types specific to the backend server.
 * These errors are used in HTTP handlers and the knockout operations and
 * can be converted to HTTP responses.
 *
 * # Error Categories
 *
 * - Validation failures (from `SharedError`) - 400
 * - Missing or invalid session - 401
 * - Permission failures - 403
 * - Missing tournaments or matches - 404
 * - Stale optimistic concurrency token - 409
 * - Storage failures (from `sqlx`) - 500
 * - Database not configured - 503
 * - Operation deadline exceeded - 504
 *
 * Any error returned from inside a transaction drops the transaction,
 * which rolls every write back.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use knockout_hub::backend::error::BackendError;
///
/// let err = BackendError::conflict("Match was modified by someone else");
/// assert_eq!(err.status_code().as_u16(), 409);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Caller has no valid session
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is authenticated but may not perform the operation
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Tournament, match or user does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Optimistic concurrency token did not match the stored value
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Database is not configured
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// The operation did not finish before its deadline
    #[error("Operation timed out")]
    DeadlineExceeded,

    /// Validation error from the bracket model
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Shorthand for a validation error on `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    /// Error returned by handlers when `DATABASE_URL` was not configured
    pub fn database_unavailable() -> Self {
        Self::ServiceUnavailable {
            message: "Database not configured".to_string(),
        }
    }

    /// 500 with a fixed client message; log the cause before calling
    pub fn internal() -> Self {
        Self::handler(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Permission { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message sent to clients
    ///
    /// Storage errors are reported generically; the details are logged.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. }
            | Self::Unauthorized { message }
            | Self::Permission { message }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::ServiceUnavailable { message } => message.clone(),
            Self::DeadlineExceeded => "Operation timed out".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::Storage(_) => "Database error".to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error() {
        let error = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
        match error {
            BackendError::HandlerError { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "Invalid request");
            }
            _ => panic!("Expected HandlerError"),
        }
    }

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(BackendError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(BackendError::permission("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(BackendError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(BackendError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(BackendError::validation("f", "x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(BackendError::DeadlineExceeded.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            BackendError::database_unavailable().status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            BackendError::Storage(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_shared_error() {
        let shared_error = SharedError::validation("field", "message");
        let backend_error: BackendError = shared_error.into();

        match backend_error {
            BackendError::SharedError(_) => {}
            _ => panic!("Expected SharedError variant"),
        }
    }

    #[test]
    fn test_storage_message_is_generic() {
        let error = BackendError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(error.message(), "Database error");
    }
}
