//! Unified error handling.
//!
//! Library operations return the narrow error type for their layer
//! ([`RemoteError`], [`ValidationError`], [`ConfigError`]); `GrocerError`
//! unifies them for callers that want a single `Result` type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::remote::RemoteError;

/// Top-level error type for the Grocer client.
#[derive(Debug, Error)]
pub enum GrocerError {
    /// The hosted data service failed or rejected a request.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Form-level validation failed before anything was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// A form-level validation failure, tagged with the offending field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The form field that failed.
    pub field: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    /// Tag `message` with the field it belongs to.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for `GrocerError`.
pub type Result<T> = std::result::Result<T, GrocerError>;
