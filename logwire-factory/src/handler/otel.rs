//! # OpenTelemetry handler factory

use logwire::handler::OpenTelemetryHandler;
use logwire::Level;
use opentelemetry_sdk::logs::SdkLoggerProvider;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::resolve::resolve_service;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`OpenTelemetryHandler`]s.
///
/// `provider` is an [`SdkLoggerProvider`] instance or service name.
#[derive(Debug)]
pub struct OpenTelemetryHandlerFactory {}

impl OpenTelemetryHandlerFactory {
    /// Creates a new OpenTelemetryHandlerFactory
    pub fn new() -> Self {
        OpenTelemetryHandlerFactory {}
    }
}

impl Default for OpenTelemetryHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for OpenTelemetryHandlerFactory {
    type Handler = OpenTelemetryHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<OpenTelemetryHandler> {
        let reader = OptionsReader::required(options)?;
        let provider: SdkLoggerProvider = resolve_service(
            container,
            reader.required_value("provider")?,
            "provider",
            "SdkLoggerProvider",
        )?;
        let handler = OpenTelemetryHandler::new(
            provider,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        decorate(handler, container, &reader)
    }
}
