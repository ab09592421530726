/*
[INPUT]:  Raw log records from the task logs endpoint
[OUTPUT]: Typed log record struct with lenient field decoding
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Deserializer, Serialize};

use super::enums::LogLevel;

/// One log record exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default, deserialize_with = "message_text")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: impl Into<String>, time: Option<&str>) -> Self {
        Self {
            level,
            message: message.into(),
            time: time.map(str::to_string),
        }
    }
}

// Structured messages are kept as their compact JSON text.
fn message_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    })
}
