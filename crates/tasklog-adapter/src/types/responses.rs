/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::models::LogRecord;
use super::requests::START_CURSOR;
use crate::http::{Result, TasklogError};

/// One page of logs plus the cursors for the next request in each direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPage {
    /// Oldest-first within the page.
    pub logs: Vec<LogRecord>,
    #[serde(default = "start_cursor")]
    pub older_cursor: i64,
    #[serde(default = "start_cursor")]
    pub newer_cursor: i64,
    #[serde(default)]
    pub has_more_older: bool,
    #[serde(default)]
    pub has_more_newer: bool,
}

fn start_cursor() -> i64 {
    START_CURSOR
}

/// Response body as served by the console API: either wrapped in the
/// `{success, message, data}` envelope or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Wrapped {
        success: bool,
        #[serde(default)]
        message: String,
        data: Option<T>,
    },
    Bare(T),
}

impl<T> ApiEnvelope<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            ApiEnvelope::Bare(data) => Ok(data),
            ApiEnvelope::Wrapped {
                success: false,
                message,
                ..
            } => Err(TasklogError::Api { code: 200, message }),
            ApiEnvelope::Wrapped {
                data: Some(data), ..
            } => Ok(data),
            ApiEnvelope::Wrapped { data: None, .. } => Err(TasklogError::InvalidResponse(
                "envelope reported success without data".to_string(),
            )),
        }
    }
}

/// Result of the range probe sent before downloading a raw log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProbe {
    /// Total file size when the server reports it.
    pub total_bytes: Option<u64>,
    pub supports_ranges: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogLevel;

    #[test]
    fn test_bare_page() {
        let envelope: ApiEnvelope<LogPage> = serde_json::from_str(
            r#"{
                "logs": [{"level": "info", "message": "sync started", "time": "2024-01-17T10:00:00Z"}],
                "older_cursor": 50,
                "newer_cursor": -1,
                "has_more_older": true,
                "has_more_newer": false
            }"#,
        )
        .expect("envelope");
        let page = envelope.into_result().expect("page");
        assert_eq!(page.logs.len(), 1);
        assert_eq!(page.logs[0].level, LogLevel::Info);
        assert_eq!(page.older_cursor, 50);
        assert_eq!(page.newer_cursor, START_CURSOR);
        assert!(page.has_more_older);
        assert!(!page.has_more_newer);
    }

    #[test]
    fn test_wrapped_page() {
        let envelope: ApiEnvelope<LogPage> = serde_json::from_str(
            r#"{"success": true, "message": "ok", "data": {"logs": [], "older_cursor": 3, "newer_cursor": 9}}"#,
        )
        .expect("envelope");
        let page = envelope.into_result().expect("page");
        assert!(page.logs.is_empty());
        assert_eq!(page.older_cursor, 3);
        assert_eq!(page.newer_cursor, 9);
        assert!(!page.has_more_older);
    }

    #[test]
    fn test_wrapped_failure() {
        let envelope: ApiEnvelope<LogPage> =
            serde_json::from_str(r#"{"success": false, "message": "file not found", "data": null}"#)
                .expect("envelope");
        match envelope.into_result() {
            Err(TasklogError::Api { message, .. }) => assert_eq!(message, "file not found"),
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrapped_success_without_data() {
        let envelope: ApiEnvelope<LogPage> =
            serde_json::from_str(r#"{"success": true, "message": "ok"}"#).expect("envelope");
        assert!(matches!(
            envelope.into_result(),
            Err(TasklogError::InvalidResponse(_))
        ));
    }
}
