//! Error types for the Train.ai server
//!
//! This module contains the error types used throughout the server.

use thiserror::Error;
use trainai_core::CoreError;

/// Server error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Flow store unreachable or failing
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::FlowNotFound(id) => ServerError::NotFound(format!("Flow {}", id)),
            CoreError::ValidationError(msg) => ServerError::ValidationError(msg),
            CoreError::StorageUnavailable(msg) => ServerError::StorageUnavailable(msg),
            CoreError::ConfigurationError(msg) => ServerError::ConfigError(msg),
            CoreError::SerializationError(msg) => ServerError::InternalError(msg),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        ServerError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl ServerError {
    /// Check if the error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServerError::NotFound(_))
    }
}
