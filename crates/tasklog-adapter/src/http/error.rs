/*
[INPUT]:  Error sources (HTTP, API, serialization, URL, IO)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the task log adapter
#[derive(Error, Debug)]
pub enum TasklogError {
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

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing a downloaded file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TasklogError {
    /// Check if a manual retry of the same request can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TasklogError::Http(_) | TasklogError::InvalidResponse(_) => true,
            TasklogError::Api { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        TasklogError::Api {
            code: status.as_u16() as i32,
            message: message.into(),
        }
    }
}

/// Result type alias for task log operations
pub type Result<T> = std::result::Result<T, TasklogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let server_err = TasklogError::api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(server_err.is_retryable());

        let throttled = TasklogError::api_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(throttled.is_retryable());

        let not_found = TasklogError::api_error(StatusCode::NOT_FOUND, "no such file");
        assert!(!not_found.is_retryable());

        assert!(!TasklogError::Config("bad base url".to_string()).is_retryable());
    }

    #[test]
    fn test_api_error_creation() {
        let err = TasklogError::api_error(StatusCode::BAD_REQUEST, "Invalid cursor");
        match err {
            TasklogError::Api { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Invalid cursor");
            }
            _ => panic!("Expected Api error variant"),
        }
    }
}
