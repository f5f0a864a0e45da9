use std::fmt;
use std::time::SystemTime;

use opentelemetry::logs::{AnyValue, LogRecord as _, Logger as _, LoggerProvider as _, Severity};
use opentelemetry_sdk::logs::{SdkLogger, SdkLoggerProvider};
use serde_json::Value;

use crate::formatter::stringify;
use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogRecord, LogResult};

/// Forwards records to an OpenTelemetry logger provider.
///
/// The channel becomes the target, the message the body, and every context
/// entry an attribute. Extra entries are added as `extra.<key>` attributes.
pub struct OpenTelemetryHandler {
    core: HandlerCore,
    provider: SdkLoggerProvider,
    logger: SdkLogger,
}

impl OpenTelemetryHandler {
    /// Creates a handler emitting through a `logwire` scoped logger of
    /// `provider`.
    pub fn new(provider: SdkLoggerProvider, level: Level, bubble: bool) -> Self {
        let logger = provider.logger("logwire");
        OpenTelemetryHandler {
            core: HandlerCore::new(level, bubble),
            provider,
            logger,
        }
    }

    /// The logger provider.
    pub fn provider(&self) -> &SdkLoggerProvider {
        &self.provider
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }
}

fn severity(level: Level) -> Severity {
    match level {
        Level::Debug => Severity::Debug,
        Level::Info => Severity::Info,
        Level::Notice => Severity::Info2,
        Level::Warning => Severity::Warn,
        Level::Error => Severity::Error,
        Level::Critical => Severity::Fatal,
        Level::Alert => Severity::Fatal2,
        Level::Emergency => Severity::Fatal4,
    }
}

fn any_value(value: &Value) -> AnyValue {
    match value {
        Value::Bool(b) => AnyValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AnyValue::Int(i),
            None => AnyValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AnyValue::from(s.clone()),
        other => AnyValue::from(stringify(other)),
    }
}

impl fmt::Debug for OpenTelemetryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTelemetryHandler")
            .field("core", &self.core)
            .finish()
    }
}

impl Handler for OpenTelemetryHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);

        let mut otel_record = self.logger.create_log_record();
        otel_record.set_timestamp(SystemTime::from(record.datetime));
        otel_record.set_severity_number(severity(record.level));
        otel_record.set_target(record.channel.clone());
        otel_record.set_body(AnyValue::from(record.message.clone()));
        for (key, value) in &record.context {
            otel_record.add_attribute(key.clone(), any_value(value));
        }
        for (key, value) in &record.extra {
            otel_record.add_attribute(format!("extra.{key}"), any_value(value));
        }
        self.logger.emit(otel_record);

        Ok(!self.core.bubble())
    }

    fn close(&self) -> LogResult<()> {
        if let Err(err) = self.provider.force_flush() {
            crate::logwire_warn!(
                name: "OpenTelemetryHandler.FlushFailed",
                error = err.to_string()
            );
        }
        Ok(())
    }
}

impl_core_handler!(OpenTelemetryHandler);
