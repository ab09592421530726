/*
[INPUT]:  Raw LogRecord values from the fetch boundary
[OUTPUT]: LogEntry values with UTC date and time-of-day strings
[POS]:    Presentation data - record normalization
[UPDATE]: When accepted timestamp formats change
*/

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use tasklog_adapter::{LogLevel, LogRecord};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A log record ready for display.
///
/// `date` and `time` are empty when the raw timestamp was missing or
/// could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub date: String,
    pub time: String,
}

impl LogEntry {
    pub fn has_timestamp(&self) -> bool {
        !self.date.is_empty()
    }
}

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        normalize(record)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_timestamp() {
            write!(f, "{} {} ", self.date, self.time)?;
        }
        write!(
            f,
            "{:<5} {}",
            self.level.as_str().to_ascii_uppercase(),
            self.message
        )
    }
}

pub fn normalize(record: LogRecord) -> LogEntry {
    let parsed = record.time.as_deref().and_then(parse_utc);
    let (date, time) = match parsed {
        Some(ts) => (
            ts.format("%Y-%m-%d").to_string(),
            ts.format("%H:%M:%S").to_string(),
        ),
        None => (String::new(), String::new()),
    };

    LogEntry {
        level: record.level,
        message: record.message,
        date,
        time,
    }
}

pub fn normalize_page(records: Vec<LogRecord>) -> Vec<LogEntry> {
    records.into_iter().map(normalize).collect()
}

/// RFC 3339 with any offset, or a naive timestamp taken as UTC.
fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
