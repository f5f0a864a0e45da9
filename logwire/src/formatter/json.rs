use serde::Serialize;

use crate::formatter::Formatter;
use crate::record::Context;
use crate::LogRecord;

/// How [`JsonFormatter::format_batch`] joins records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// A single JSON array.
    #[default]
    Json,
    /// One JSON document per line.
    Newlines,
}

/// Encodes records as JSON objects.
#[derive(Clone, Debug)]
pub struct JsonFormatter {
    batch_mode: BatchMode,
    append_newline: bool,
    ignore_empty_context_and_extra: bool,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Context>,
    level: u16,
    level_name: &'static str,
    channel: &'a str,
    datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<&'a Context>,
}

impl JsonFormatter {
    /// Creates a formatter.
    pub fn new(batch_mode: BatchMode, append_newline: bool) -> Self {
        JsonFormatter {
            batch_mode,
            append_newline,
            ignore_empty_context_and_extra: false,
        }
    }

    /// Leaves empty `context`/`extra` objects out of the document.
    pub fn with_ignore_empty_context_and_extra(mut self, ignore: bool) -> Self {
        self.ignore_empty_context_and_extra = ignore;
        self
    }

    /// The batch mode.
    pub fn batch_mode(&self) -> BatchMode {
        self.batch_mode
    }

    /// Whether a newline follows each formatted record.
    pub fn is_appending_newline(&self) -> bool {
        self.append_newline
    }

    fn keep<'a>(&self, values: &'a Context) -> Option<&'a Context> {
        if self.ignore_empty_context_and_extra && values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    fn to_json_record<'a>(&self, record: &'a LogRecord) -> JsonRecord<'a> {
        JsonRecord {
            message: &record.message,
            context: self.keep(&record.context),
            level: record.level.value(),
            level_name: record.level.name(),
            channel: &record.channel,
            datetime: record
                .datetime
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, false),
            extra: self.keep(&record.extra),
        }
    }

    fn encode(&self, record: &LogRecord) -> String {
        // Serializing borrowed strings and JSON maps cannot fail.
        serde_json::to_string(&self.to_json_record(record)).unwrap_or_default()
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        JsonFormatter::new(BatchMode::Json, true)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut output = self.encode(record);
        if self.append_newline {
            output.push('\n');
        }
        output
    }

    fn format_batch(&self, records: &[LogRecord]) -> String {
        match self.batch_mode {
            BatchMode::Json => {
                let batch: Vec<JsonRecord<'_>> =
                    records.iter().map(|r| self.to_json_record(r)).collect();
                serde_json::to_string(&batch).unwrap_or_default()
            }
            BatchMode::Newlines => records
                .iter()
                .map(|r| self.encode(r))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn record(message: &str) -> LogRecord {
        LogRecord::new("billing", Level::Error, message)
            .with_datetime(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
    }

    #[test]
    fn formats_single_record() {
        let formatter = JsonFormatter::default();
        let output = formatter.format(&record("charge failed").with_context_value("id", 7));
        assert!(output.ends_with('\n'));
        let parsed: Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(
            parsed,
            json!({
                "message": "charge failed",
                "context": {"id": 7},
                "level": 400,
                "level_name": "ERROR",
                "channel": "billing",
                "datetime": "2024-01-02T03:04:05.000000+00:00",
                "extra": {}
            })
        );
    }

    #[test]
    fn drops_empty_context_and_extra() {
        let formatter =
            JsonFormatter::new(BatchMode::Json, false).with_ignore_empty_context_and_extra(true);
        let parsed: Value = serde_json::from_str(&formatter.format(&record("x"))).unwrap();
        assert!(parsed.get("context").is_none());
        assert!(parsed.get("extra").is_none());
    }

    #[test]
    fn batch_modes() {
        let records = vec![record("a"), record("b")];

        let as_array = JsonFormatter::new(BatchMode::Json, true).format_batch(&records);
        let parsed: Vec<Value> = serde_json::from_str(&as_array).unwrap();
        assert_eq!(parsed.len(), 2);

        let as_lines = JsonFormatter::new(BatchMode::Newlines, true).format_batch(&records);
        let lines: Vec<&str> = as_lines.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            serde_json::from_str::<Value>(lines[1]).unwrap()["message"],
            "b"
        );
    }
}
