/*
[INPUT]:  Log page coordinates (project, job, task, file, cursor, limit, direction)
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::enums::Direction;

/// Cursor value that asks the backend for the most recent window.
pub const START_CURSOR: i64 = -1;

/// One page request against the task logs endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPageRequest {
    pub project_id: String,
    pub job_id: String,
    pub task_id: String,
    pub file_path: String,
    pub cursor: i64,
    pub limit: u32,
    pub direction: Direction,
}

/// JSON body of the log page and download requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFileBody {
    pub file_path: String,
}
