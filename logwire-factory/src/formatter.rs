//! # Formatter factories
//!
//! Registered in the formatter plugin manager as `line`, `json` and
//! `logstash`.

use logwire::formatter::{BatchMode, JsonFormatter, LineFormatter, LogstashFormatter};

use crate::plugin_manager::{FormatterFactory, FormatterPluginManager};
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`LineFormatter`]s.
#[derive(Debug)]
pub struct LineFormatterFactory {}

impl LineFormatterFactory {
    /// Creates a new LineFormatterFactory
    pub fn new() -> Self {
        LineFormatterFactory {}
    }
}

impl Default for LineFormatterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterFactory for LineFormatterFactory {
    type Formatter = LineFormatter;

    fn create_formatter(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<LineFormatter> {
        let reader = OptionsReader::optional(options)?;
        Ok(LineFormatter::new(reader.string("format")?, reader.string("date_format")?)
            .with_inline_line_breaks(reader.bool("allow_inline_line_breaks", false)?)
            .with_ignore_empty_context_and_extra(
                reader.bool("ignore_empty_context_and_extra", false)?,
            ))
    }
}

/// Factory for [`JsonFormatter`]s.
///
/// `batch_mode` is `json` (one array) or `newlines` (one document per line).
#[derive(Debug)]
pub struct JsonFormatterFactory {}

impl JsonFormatterFactory {
    /// Creates a new JsonFormatterFactory
    pub fn new() -> Self {
        JsonFormatterFactory {}
    }
}

impl Default for JsonFormatterFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn batch_mode(reader: &OptionsReader<'_>) -> FactoryResult<BatchMode> {
    match reader.string("batch_mode")?.as_deref().map(str::to_lowercase).as_deref() {
        None | Some("json") => Ok(BatchMode::Json),
        Some("newlines") => Ok(BatchMode::Newlines),
        Some(other) => Err(FactoryError::not_created(format!(
            "Invalid batch_mode \"{other}\", use json or newlines"
        ))),
    }
}

impl FormatterFactory for JsonFormatterFactory {
    type Formatter = JsonFormatter;

    fn create_formatter(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<JsonFormatter> {
        let reader = OptionsReader::optional(options)?;
        Ok(
            JsonFormatter::new(batch_mode(&reader)?, reader.bool("append_newline", true)?)
                .with_ignore_empty_context_and_extra(
                    reader.bool("ignore_empty_context_and_extra", false)?,
                ),
        )
    }
}

/// Factory for [`LogstashFormatter`]s.
#[derive(Debug)]
pub struct LogstashFormatterFactory {}

impl LogstashFormatterFactory {
    /// Creates a new LogstashFormatterFactory
    pub fn new() -> Self {
        LogstashFormatterFactory {}
    }
}

impl Default for LogstashFormatterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatterFactory for LogstashFormatterFactory {
    type Formatter = LogstashFormatter;

    fn create_formatter(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<LogstashFormatter> {
        let reader = OptionsReader::required(options)?;
        Ok(LogstashFormatter::new(
            reader.required_string("application_name")?,
            reader.string("system_name")?,
            reader.string("extra_key")?,
            reader.string("context_key")?,
        ))
    }
}

pub(crate) fn register_defaults(manager: &mut FormatterPluginManager) {
    manager.register_factory("line", LineFormatterFactory::new());
    manager.register_factory("json", JsonFormatterFactory::new());
    manager.register_factory("logstash", LogstashFormatterFactory::new());
    manager.alias("LineFormatter", "line");
    manager.alias("JsonFormatter", "json");
    manager.alias("LogstashFormatter", "logstash");
}
