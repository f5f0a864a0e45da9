use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::Level;

/// Structured data attached to a record, either by the caller (`context`) or
/// by processors (`extra`).
pub type Context = Map<String, Value>;

/// A single log event travelling through processors and handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    /// The log message, possibly with `{placeholder}`s.
    pub message: String,
    /// Caller supplied data.
    pub context: Context,
    /// Severity.
    pub level: Level,
    /// Name of the logger that created the record.
    pub channel: String,
    /// Creation time.
    pub datetime: DateTime<Utc>,
    /// Data added by processors.
    pub extra: Context,
}

impl LogRecord {
    /// Creates a record timestamped now, with empty context and extra.
    pub fn new(channel: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        LogRecord {
            message: message.into(),
            context: Context::new(),
            level,
            channel: channel.into(),
            datetime: Utc::now(),
            extra: Context::new(),
        }
    }

    /// Replaces the context.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Adds a single context entry.
    pub fn with_context_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Overrides the creation time.
    pub fn with_datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = datetime;
        self
    }
}
