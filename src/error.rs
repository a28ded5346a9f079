//! Error types for entity-state operations.

use thiserror::Error;

/// Main error type for entity-state operations.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not an entity state at {at}: {reason}")]
    Decode { at: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StateError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        StateError::InvalidArgument(message.into())
    }
}

impl From<serde_json::Error> for StateError {
    fn from(e: serde_json::Error) -> Self {
        StateError::Serialization(e.to_string())
    }
}

/// Result type for entity-state operations.
pub type Result<T> = std::result::Result<T, StateError>;
