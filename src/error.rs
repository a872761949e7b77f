//! Error types for the ZEEF client.

use thiserror::Error;

use crate::api::Envelope;
use crate::domain::FieldError;

/// Errors returned by every fallible client operation
#[derive(Debug, Error)]
pub enum ZeefError {
    /// Required identifying arguments were missing or empty
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A value was outside its enumerated set
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Payload attribute missing or of the wrong shape
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The API answered with a non-2xx status
    #[error("API request failed with status {}: {}", .0.status, .0.content)]
    Api(Envelope),

    /// The API answered 2xx but the body was not what the operation needs
    #[error("Unexpected response content: {0}")]
    UnexpectedContent(String),

    /// Transport failure (DNS, connection, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document rendering failed
    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),
}

impl ZeefError {
    /// The `{status, content}` envelope, if this is an API failure
    pub fn envelope(&self) -> Option<&Envelope> {
        match self {
            ZeefError::Api(envelope) => Some(envelope),
            _ => None,
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ZeefError>;
