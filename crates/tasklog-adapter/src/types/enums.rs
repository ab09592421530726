/*
[INPUT]:  Wire strings for log levels and pagination directions
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which end of the loaded window a page request extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Older,
    Newer,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Older => "older",
            Direction::Newer => "newer",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a log record.
///
/// Decoding never fails: the comparison is case-insensitive, `warning` is
/// accepted for `warn`, and anything unrecognised becomes `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    #[default]
    Unknown,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Unknown => "unknown",
        }
    }

    /// True for levels shown by an "errors only" filter.
    pub fn is_error(self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }
}

impl From<&str> for LogLevel {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Unknown,
        }
    }
}

impl From<String> for LogLevel {
    fn from(value: String) -> Self {
        LogLevel::from(value.as_str())
    }
}

impl From<Option<String>> for LogLevel {
    fn from(value: Option<String>) -> Self {
        value.map(LogLevel::from).unwrap_or_default()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("debug", LogLevel::Debug)]
    #[case("INFO", LogLevel::Info)]
    #[case("warn", LogLevel::Warn)]
    #[case("Warning", LogLevel::Warn)]
    #[case("error", LogLevel::Error)]
    #[case("fatal", LogLevel::Fatal)]
    #[case("trace", LogLevel::Unknown)]
    #[case("", LogLevel::Unknown)]
    fn test_level_decoding(#[case] raw: &str, #[case] expected: LogLevel) {
        let decoded: LogLevel =
            serde_json::from_value(serde_json::Value::String(raw.to_string())).expect("level");
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_null_level_is_unknown() {
        let decoded: LogLevel = serde_json::from_str("null").expect("level");
        assert_eq!(decoded, LogLevel::Unknown);
    }

    #[test]
    fn test_error_levels() {
        assert!(LogLevel::Error.is_error());
        assert!(LogLevel::Fatal.is_error());
        assert!(!LogLevel::Warn.is_error());
        assert!(!LogLevel::Unknown.is_error());
    }

    #[test]
    fn test_direction_wire_format() {
        assert_eq!(
            serde_json::to_string(&Direction::Older).expect("serialize"),
            "\"older\""
        );
        assert_eq!(Direction::Newer.to_string(), "newer");
    }
}
