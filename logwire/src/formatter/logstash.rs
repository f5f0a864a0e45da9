use serde_json::{Map, Value};

use crate::formatter::Formatter;
use crate::LogRecord;

/// Serializes records in the Logstash event (v1) layout.
#[derive(Clone, Debug)]
pub struct LogstashFormatter {
    application_name: String,
    system_name: String,
    extra_key: String,
    context_key: String,
}

impl LogstashFormatter {
    /// Creates a formatter. The system name falls back to `$HOSTNAME`, then `localhost`.
    pub fn new(
        application_name: impl Into<String>,
        system_name: Option<String>,
        extra_key: Option<String>,
        context_key: Option<String>,
    ) -> Self {
        LogstashFormatter {
            application_name: application_name.into(),
            system_name: system_name.unwrap_or_else(|| {
                std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_owned())
            }),
            extra_key: extra_key.unwrap_or_else(|| "extra".to_owned()),
            context_key: context_key.unwrap_or_else(|| "context".to_owned()),
        }
    }

    /// Value of the `app` field.
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Value of the `host` field.
    pub fn system_name(&self) -> &str {
        &self.system_name
    }
}

impl Formatter for LogstashFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut event = Map::new();
        event.insert(
            "@timestamp".into(),
            record
                .datetime
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
                .into(),
        );
        event.insert("@version".into(), Value::from(1));
        event.insert("host".into(), self.system_name.clone().into());
        event.insert("message".into(), record.message.clone().into());
        event.insert("type".into(), record.channel.clone().into());
        event.insert("channel".into(), record.channel.clone().into());
        event.insert("level".into(), record.level.name().into());
        event.insert("level_value".into(), record.level.value().into());
        if !self.application_name.is_empty() {
            event.insert("app".into(), self.application_name.clone().into());
        }
        if !record.extra.is_empty() {
            event.insert(self.extra_key.clone(), Value::Object(record.extra.clone()));
        }
        if !record.context.is_empty() {
            event.insert(
                self.context_key.clone(),
                Value::Object(record.context.clone()),
            );
        }

        let mut output = Value::Object(event).to_string();
        output.push('\n');
        output
    }
}
