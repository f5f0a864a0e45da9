use chrono::DateTime;
use serde_json::Value;

use crate::processor::Processor;
use crate::LogRecord;

/// Interpolates `{key}` placeholders in the message with context values.
///
/// Strings are inserted as-is (or re-formatted with `date_format` when they
/// hold an RFC 3339 timestamp), scalars in their JSON form, arrays as
/// `array[...]` and objects as `[object {...}]`. Placeholders without a
/// matching context key are left untouched.
#[derive(Clone, Debug, Default)]
pub struct PsrLogMessageProcessor {
    date_format: Option<String>,
    remove_used_context_fields: bool,
}

impl PsrLogMessageProcessor {
    /// Creates a processor.
    pub fn new(date_format: Option<String>, remove_used_context_fields: bool) -> Self {
        PsrLogMessageProcessor {
            date_format,
            remove_used_context_fields,
        }
    }

    /// Date format applied to timestamp values.
    pub fn date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }

    /// Whether interpolated keys are removed from the context.
    pub fn removes_used_context_fields(&self) -> bool {
        self.remove_used_context_fields
    }

    fn render(&self, value: &Value) -> String {
        match value {
            Value::String(s) => match &self.date_format {
                Some(format) => match DateTime::parse_from_rfc3339(s) {
                    Ok(datetime) => datetime.format(format).to_string(),
                    Err(_) => s.clone(),
                },
                None => s.clone(),
            },
            Value::Array(_) => format!("array{value}"),
            Value::Object(_) => format!("[object {value}]"),
            other => other.to_string(),
        }
    }
}

impl Processor for PsrLogMessageProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        if !record.message.contains('{') {
            return record;
        }

        let mut output = String::with_capacity(record.message.len());
        let mut used = Vec::new();
        let mut rest = record.message.as_str();
        while let Some(start) = rest.find('{') {
            output.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match record.context.get(key) {
                        Some(value) => {
                            output.push_str(&self.render(value));
                            used.push(key.to_owned());
                        }
                        None => {
                            output.push('{');
                            output.push_str(key);
                            output.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    output.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        output.push_str(rest);

        if self.remove_used_context_fields {
            for key in &used {
                record.context.remove(key);
            }
        }
        record.message = output;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use serde_json::json;

    #[test]
    fn interpolates_placeholders() {
        let record =
            LogRecord::new("app", Level::Info, "User {user} bought {count} items {missing}")
                .with_context_value("user", "ada")
                .with_context_value("count", 3);
        let record = PsrLogMessageProcessor::default().process(record);
        assert_eq!(record.message, "User ada bought 3 items {missing}");
        assert_eq!(record.context.len(), 2);
    }

    #[test]
    fn removes_used_fields_and_renders_structures() {
        let record = LogRecord::new("app", Level::Info, "{list} {obj} {flag} {nothing} {open")
            .with_context_value("list", json!([1, 2]))
            .with_context_value("obj", json!({"a": 1}))
            .with_context_value("flag", true)
            .with_context_value("nothing", Value::Null)
            .with_context_value("kept", 1);
        let record = PsrLogMessageProcessor::new(None, true).process(record);
        assert_eq!(
            record.message,
            "array[1,2] [object {\"a\":1}] true null {open"
        );
        assert_eq!(record.context.keys().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn formats_dates() {
        let record = LogRecord::new("app", Level::Info, "at {when}")
            .with_context_value("when", "2024-03-04T05:06:07+00:00");
        let record = PsrLogMessageProcessor::new(Some("%d.%m.%Y".into()), false).process(record);
        assert_eq!(record.message, "at 04.03.2024");
    }
}
