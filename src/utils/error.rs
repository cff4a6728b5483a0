//! Error handling module
//!
//! Defines error types and handling logic used in the project

use serde_json::Value;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum MagicError {
    /// Missing, redundant or malformed call configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success HTTP response
    #[error("Transport error: {status} {message}")]
    Transport {
        /// HTTP status code
        status: u16,
        /// Status text, followed by the response body when there is one
        message: String,
    },

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response payload that cannot be normalized
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Postprocess rejected every attempt
    #[error("Postprocess rejected the result of all {attempts} attempts")]
    PostprocessExhausted {
        /// Number of requests issued
        attempts: u32,
        /// Last normalized payload, before postprocessing
        last_value: Value,
    },
}

impl MagicError {
    /// Get error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            MagicError::Configuration(_) => "configuration_error",
            MagicError::Transport { .. } | MagicError::HttpClient(_) => "transport_error",
            MagicError::Serialization(_) | MagicError::UnexpectedResponse(_) => "response_error",
            MagicError::PostprocessExhausted { .. } => "postprocess_exhausted",
        }
    }

    /// Whether the error was raised before anything was sent
    pub fn is_configuration(&self) -> bool {
        matches!(self, MagicError::Configuration(_))
    }

    /// HTTP status of a transport failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            MagicError::Transport { status, .. } => Some(*status),
            MagicError::HttpClient(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias
pub type MagicResult<T> = Result<T, MagicError>;

/// Error construction helpers
pub mod helpers {
    use super::*;

    /// Create configuration error
    pub fn configuration_error(message: impl Into<String>) -> MagicError {
        MagicError::Configuration(message.into())
    }

    /// Create unexpected response error
    pub fn unexpected_response(message: impl Into<String>) -> MagicError {
        MagicError::UnexpectedResponse(message.into())
    }

    /// Create transport error from a status code and its text
    pub fn transport_error(status: u16, message: impl Into<String>) -> MagicError {
        MagicError::Transport {
            status,
            message: message.into(),
        }
    }
}

/// Error context extension trait
pub trait ErrorContext<T> {
    /// Add configuration error context
    fn configuration_context(self, message: &str) -> MagicResult<T>;

    /// Add response error context
    fn response_context(self, message: &str) -> MagicResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn configuration_context(self, message: &str) -> MagicResult<T> {
        self.map_err(|e| MagicError::Configuration(format!("{}: {}", message, e)))
    }

    fn response_context(self, message: &str) -> MagicResult<T> {
        self.map_err(|e| MagicError::UnexpectedResponse(format!("{}: {}", message, e)))
    }
}
