//! # Formatters
//!
//! A [`Formatter`] converts a [`LogRecord`] into the representation a
//! handler writes out. Handlers fall back to a [`LineFormatter`] unless they
//! document another default.

mod json;
mod line;
mod logstash;

pub use json::{BatchMode, JsonFormatter};
pub use line::LineFormatter;
pub use logstash::LogstashFormatter;

use std::fmt::Debug;

use serde_json::Value;

use crate::LogRecord;

/// Converts log records to their output representation.
pub trait Formatter: Send + Sync + Debug {
    /// Formats a single record.
    fn format(&self, record: &LogRecord) -> String;

    /// Formats a batch of records. Defaults to concatenating [`Formatter::format`].
    fn format_batch(&self, records: &[LogRecord]) -> String {
        records.iter().map(|record| self.format(record)).collect()
    }
}

/// Renders a context/extra value for inline use: strings are written raw,
/// everything else as compact JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}
