//! Structured log entries and the injected log sink.
//!
//! Components that report on a run take a `LogSink` rather than writing to
//! a process-wide logger, so their output can be captured in tests and
//! routed to whatever backend the binary configures.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity of a log entry, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Default,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    /// Numeric severity code (0, 100, ..., 800).
    pub fn code(self) -> u16 {
        match self {
            Self::Default => 0,
            Self::Debug => 100,
            Self::Info => 200,
            Self::Notice => 300,
            Self::Warning => 400,
            Self::Error => 500,
            Self::Critical => 600,
            Self::Alert => 700,
            Self::Emergency => 800,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Notice => "NOTICE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
            Self::Alert => "ALERT",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message with attached structured fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: Map::new(),
        }
    }

    /// Attach a field (builder style).
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Either a plain message or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogEntry {
    Message(String),
    Record(LogRecord),
}

impl LogEntry {
    pub fn message(&self) -> &str {
        match self {
            Self::Message(msg) => msg,
            Self::Record(record) => &record.message,
        }
    }

    /// Structured fields, if any.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Message(_) => None,
            Self::Record(record) => Some(&record.fields),
        }
    }
}

impl From<&str> for LogEntry {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_string())
    }
}

impl From<String> for LogEntry {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

impl From<LogRecord> for LogEntry {
    fn from(record: LogRecord) -> Self {
        Self::Record(record)
    }
}

/// Destination for run log entries.
pub trait LogSink: Send + Sync {
    /// Emit one entry at the given severity.
    fn log(&self, severity: Severity, entry: LogEntry);

    fn info(&self, entry: LogEntry) {
        self.log(Severity::Info, entry);
    }

    fn warn(&self, entry: LogEntry) {
        self.log(Severity::Warning, entry);
    }

    fn error(&self, entry: LogEntry) {
        self.log(Severity::Error, entry);
    }
}
