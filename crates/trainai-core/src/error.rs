use thiserror::Error;

/// Core error type for flow storage and validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Flow not found
    #[error("Flow not found: {0}")]
    FlowNotFound(String),

    /// Payload failed validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Backing store cannot be reached or refused the operation
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
