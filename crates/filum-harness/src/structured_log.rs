//! Structured logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL record with required + optional fields.
//! - [`LogEmitter`]: writes JSONL lines to a file or stdout.
//! - [`validate_log_line`]: checks a single line against the schema.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Case outcome recorded in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp`, `level`, `event`. Optional fields give
/// per-case context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    pub fn event(timestamp: &str, level: LogLevel, event: &str) -> Self {
        LogEntry {
            timestamp: timestamp.to_string(),
            level,
            event: event.to_string(),
            case: None,
            outcome: None,
            detail: None,
        }
    }

    pub fn for_case(mut self, case: &str, outcome: Outcome, detail: Option<String>) -> Self {
        self.case = Some(case.to_string());
        self.outcome = Some(outcome);
        self.detail = detail;
        self
    }

    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Validate one JSONL line: parseable, required fields non-empty.
pub fn validate_log_line(line: &str) -> Result<LogEntry, String> {
    let entry: LogEntry =
        serde_json::from_str(line).map_err(|e| format!("not a valid log line: {e}"))?;
    if entry.timestamp.is_empty() {
        return Err("timestamp must be non-empty".into());
    }
    if entry.event.is_empty() {
        return Err("event must be non-empty".into());
    }
    Ok(entry)
}

/// Writes JSONL lines to a file, or stdout when no path is given.
pub struct LogEmitter {
    sink: Option<std::fs::File>,
}

impl LogEmitter {
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        Ok(LogEmitter {
            sink: Some(std::fs::File::create(path)?),
        })
    }

    pub fn to_stdout() -> Self {
        LogEmitter { sink: None }
    }

    pub fn emit(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry
            .to_jsonl()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        match &mut self.sink {
            Some(f) => writeln!(f, "{line}"),
            None => writeln!(std::io::stdout(), "{line}"),
        }
    }
}
