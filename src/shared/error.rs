//! Shared Error Types
//!
//! This module defines error types that are shared between the bracket model
//! and the backend. These errors represent failures that can be detected
//! without touching storage, such as malformed bracket requests.
//!
//! # Usage
//!
//! ```rust
//! use knockout_hub::shared::error::SharedError;
//!
//! let error = SharedError::validation("participants", "At least two participants are required");
//! ```
use thiserror::Error;

/// Shared error types that can occur in both the model and the backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
