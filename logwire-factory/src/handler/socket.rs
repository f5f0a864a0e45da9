//! # Socket handler factory

use logwire::handler::SocketHandler;
use logwire::Level;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`SocketHandler`]s.
///
/// Timeouts are given in seconds; the handler rejects negative values.
#[derive(Debug)]
pub struct SocketHandlerFactory {}

impl SocketHandlerFactory {
    /// Creates a new SocketHandlerFactory
    pub fn new() -> Self {
        SocketHandlerFactory {}
    }
}

impl Default for SocketHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for SocketHandlerFactory {
    type Handler = SocketHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<SocketHandler> {
        let reader = OptionsReader::required(options)?;
        let mut handler = SocketHandler::new(
            reader.required_string("connection_string")?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );

        if reader.contains("timeout") {
            handler.set_timeout(reader.f64("timeout", 0.0)?)?;
        }
        if reader.contains("connection_timeout") {
            handler.set_connection_timeout(reader.f64("connection_timeout", 0.0)?)?;
        }
        if reader.contains("writing_timeout") {
            handler.set_writing_timeout(reader.f64("writing_timeout", 0.0)?)?;
        }
        handler.set_persistent(reader.bool("persistent", false)?);
        if reader.contains("chunk_size") {
            handler.set_chunk_size(reader.usize("chunk_size", 0)?)?;
        }

        decorate(handler, container, &reader)
    }
}
