use serde_json::Value;

use crate::formatter::{stringify, Formatter};
use crate::record::Context;
use crate::LogRecord;

/// Formats records into single lines using a `%placeholder%` template.
///
/// Supported placeholders: `%datetime%`, `%channel%`, `%level_name%`,
/// `%level%`, `%message%`, `%context%`, `%extra%`, and `%context.<key>%` /
/// `%extra.<key>%` for single entries. Entries consumed by a keyed
/// placeholder are left out of the `%context%`/`%extra%` dumps.
#[derive(Clone, Debug)]
pub struct LineFormatter {
    format: String,
    date_format: String,
    allow_inline_line_breaks: bool,
    ignore_empty_context_and_extra: bool,
}

impl LineFormatter {
    /// Template used when none is configured.
    pub const SIMPLE_FORMAT: &'static str =
        "[%datetime%] %channel%.%level_name%: %message% %context% %extra%\n";
    /// `chrono` date format used when none is configured.
    pub const SIMPLE_DATE: &'static str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

    /// Creates a formatter; `None` selects the defaults.
    pub fn new(format: Option<String>, date_format: Option<String>) -> Self {
        LineFormatter {
            format: format.unwrap_or_else(|| Self::SIMPLE_FORMAT.to_owned()),
            date_format: date_format.unwrap_or_else(|| Self::SIMPLE_DATE.to_owned()),
            allow_inline_line_breaks: false,
            ignore_empty_context_and_extra: false,
        }
    }

    /// Keeps line breaks inside messages and values instead of flattening them.
    pub fn with_inline_line_breaks(mut self, allow: bool) -> Self {
        self.allow_inline_line_breaks = allow;
        self
    }

    /// Drops empty `%context%`/`%extra%` dumps instead of printing `[]`.
    pub fn with_ignore_empty_context_and_extra(mut self, ignore: bool) -> Self {
        self.ignore_empty_context_and_extra = ignore;
        self
    }

    /// The template.
    pub fn format_template(&self) -> &str {
        &self.format
    }

    /// The date format.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Whether line breaks are kept.
    pub fn allows_inline_line_breaks(&self) -> bool {
        self.allow_inline_line_breaks
    }

    /// Whether empty context and extra are dropped.
    pub fn ignores_empty_context_and_extra(&self) -> bool {
        self.ignore_empty_context_and_extra
    }

    fn clean(&self, text: &str) -> String {
        if self.allow_inline_line_breaks {
            text.to_owned()
        } else {
            text.replace("\r\n", " ").replace(['\r', '\n'], " ")
        }
    }

    fn dump(&self, values: &Context) -> String {
        if values.is_empty() {
            "[]".to_owned()
        } else {
            self.clean(&Value::Object(values.clone()).to_string())
        }
    }

    fn replace_keyed(&self, output: &mut String, prefix: &str, values: &mut Context) {
        let used: Vec<String> = values
            .keys()
            .filter(|key| output.contains(&format!("%{prefix}.{key}%")))
            .cloned()
            .collect();
        for key in used {
            if let Some(value) = values.remove(&key) {
                *output = output.replace(
                    &format!("%{prefix}.{key}%"),
                    &self.clean(&stringify(&value)),
                );
            }
        }
    }
}

impl Default for LineFormatter {
    fn default() -> Self {
        LineFormatter::new(None, None)
    }
}

impl Formatter for LineFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut output = self.format.clone();
        let mut context = record.context.clone();
        let mut extra = record.extra.clone();

        self.replace_keyed(&mut output, "extra", &mut extra);
        self.replace_keyed(&mut output, "context", &mut context);

        if self.ignore_empty_context_and_extra {
            if context.is_empty() {
                output = output.replace("%context%", "");
            }
            if extra.is_empty() {
                output = output.replace("%extra%", "");
            }
        }

        output = output
            .replace(
                "%datetime%",
                &record.datetime.format(&self.date_format).to_string(),
            )
            .replace("%channel%", &record.channel)
            .replace("%level_name%", record.level.name())
            .replace("%level%", &record.level.value().to_string())
            .replace("%context%", &self.dump(&context))
            .replace("%extra%", &self.dump(&extra))
            .replace("%message%", &self.clean(&record.message));

        strip_unused_placeholders(&output)
    }
}

/// Removes `%context.x%` and `%extra.x%` placeholders whose key was absent.
fn strip_unused_placeholders(output: &str) -> String {
    let mut result = String::with_capacity(output.len());
    let mut rest = output;
    while let Some(start) = rest.find('%') {
        let candidate = &rest[start + 1..];
        let keyed = candidate.starts_with("context.") || candidate.starts_with("extra.");
        match candidate.find('%') {
            Some(end) if keyed && !candidate[..end].contains(char::is_whitespace) => {
                result.push_str(&rest[..start]);
                rest = &candidate[end + 1..];
            }
            _ => {
                result.push_str(&rest[..=start]);
                rest = candidate;
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use chrono::{TimeZone, Utc};

    fn record() -> LogRecord {
        LogRecord::new("app", Level::Warning, "disk almost full")
            .with_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
    }

    #[test]
    fn formats_with_simple_template() {
        let formatter = LineFormatter::default();
        let line = formatter.format(&record().with_context_value("free", 3));
        assert_eq!(
            line,
            "[2024-05-01T12:30:00.000000+00:00] app.WARNING: disk almost full {\"free\":3} []\n"
        );
    }

    #[test]
    fn ignores_empty_context_and_extra() {
        let formatter =
            LineFormatter::new(Some("%level_name%: %message% %context%%extra%".into()), None)
                .with_ignore_empty_context_and_extra(true);
        assert_eq!(formatter.format(&record()), "WARNING: disk almost full ");
    }

    #[test]
    fn keyed_placeholders_consume_entries() {
        let formatter = LineFormatter::new(
            Some("%message% on %context.mount% %context% %extra.uid%%extra.missing%".into()),
            None,
        );
        let mut rec = record().with_context_value("mount", "/var");
        rec.extra.insert("uid".into(), "abc".into());
        assert_eq!(formatter.format(&rec), "disk almost full on /var [] abc");
    }

    #[test]
    fn flattens_line_breaks_unless_allowed() {
        let rec = LogRecord::new("app", Level::Info, "first\nsecond\r\nthird");
        let template = Some("%message%".to_owned());

        let flat = LineFormatter::new(template.clone(), None);
        assert_eq!(flat.format(&rec), "first second third");

        let multi = LineFormatter::new(template, None).with_inline_line_breaks(true);
        assert_eq!(multi.format(&rec), "first\nsecond\r\nthird");
    }

    #[test]
    fn custom_date_format() {
        let formatter = LineFormatter::new(Some("%datetime%".into()), Some("%Y/%m/%d".into()));
        assert_eq!(formatter.format(&record()), "2024/05/01");
    }

    #[test]
    fn leaves_literal_percent_signs() {
        let rec = LogRecord::new("app", Level::Info, "cpu at 95%");
        let formatter = LineFormatter::new(Some("%message% (100% sure)".into()), None);
        assert_eq!(formatter.format(&rec), "cpu at 95% (100% sure)");
    }
}
