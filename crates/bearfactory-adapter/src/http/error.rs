/*
[INPUT]:  Error sources (HTTP, API status, serialization, configuration)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Bear's Task Factory adapter
#[derive(Error, Debug)]
pub enum FactoryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Response parsed but did not carry what the caller needs
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing key or endpoint
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Request timed out
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },
}

impl FactoryError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            FactoryError::Http(_)
            | FactoryError::RateLimit { .. }
            | FactoryError::Timeout { .. } => true,
            FactoryError::Api { code, .. } => *code >= 500,
            _ => false,
        }
    }

    /// Get retry delay in seconds (if retryable)
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            FactoryError::RateLimit { retry_after } => Some(*retry_after),
            FactoryError::Timeout { .. } => Some(1),
            _ => None,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        FactoryError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, FactoryError>;
