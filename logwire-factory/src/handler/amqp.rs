//! # AMQP handler factory

use std::sync::Arc;

use logwire::handler::{AmqpHandler, MessagePublisher};
use logwire::Level;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::resolve::resolve_service;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`AmqpHandler`]s.
///
/// `publisher` is an `Arc<dyn MessagePublisher>` instance or service name.
#[derive(Debug)]
pub struct AmqpHandlerFactory {}

impl AmqpHandlerFactory {
    /// Creates a new AmqpHandlerFactory
    pub fn new() -> Self {
        AmqpHandlerFactory {}
    }
}

impl Default for AmqpHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for AmqpHandlerFactory {
    type Handler = AmqpHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<AmqpHandler> {
        let reader = OptionsReader::required(options)?;
        let publisher: Arc<dyn MessagePublisher> = resolve_service(
            container,
            reader.required_value("publisher")?,
            "publisher",
            "MessagePublisher",
        )?;
        let handler = AmqpHandler::new(
            publisher,
            reader.string("exchange_name")?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        decorate(handler, container, &reader)
    }
}
