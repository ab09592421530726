/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for tasklog-adapter tests

use tasklog_adapter::{Direction, LogPageRequest};
use wiremock::MockServer;

pub const LOGS_PATH: &str = "/api/v1/project/123/jobs/42/tasks/run-9/logs";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Mock bearer token for testing
pub fn mock_token() -> String {
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.test.signature".to_string()
}

/// Page request against the fixture job/task/file
pub fn page_request(cursor: i64, limit: u32, direction: Direction) -> LogPageRequest {
    LogPageRequest {
        project_id: "123".to_string(),
        job_id: "42".to_string(),
        task_id: "run-9".to_string(),
        file_path: "logs/sync.log".to_string(),
        cursor,
        limit,
        direction,
    }
}

/// Wire page with `count` info lines numbered from `first`
pub fn page_json(
    first: i64,
    count: i64,
    older_cursor: i64,
    newer_cursor: i64,
    has_more_older: bool,
    has_more_newer: bool,
) -> serde_json::Value {
    let logs = (first..first + count)
        .map(|n| {
            serde_json::json!({
                "level": "info",
                "message": format!("line {n}"),
                "time": "2024-01-17T10:00:00Z",
            })
        })
        .collect::<Vec<_>>();
    serde_json::json!({
        "logs": logs,
        "older_cursor": older_cursor,
        "newer_cursor": newer_cursor,
        "has_more_older": has_more_older,
        "has_more_newer": has_more_newer,
    })
}
