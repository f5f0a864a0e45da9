//! # Stream handler factory

use logwire::handler::{StreamHandler, StreamTarget};
use logwire::Level;

use crate::handler::{decorate, file_permission};
use crate::plugin_manager::HandlerFactory;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`StreamHandler`]s.
///
/// `stream` is `stdout`, `stderr` or a file path.
#[derive(Debug)]
pub struct StreamHandlerFactory {}

impl StreamHandlerFactory {
    /// Creates a new StreamHandlerFactory
    pub fn new() -> Self {
        StreamHandlerFactory {}
    }
}

impl Default for StreamHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for StreamHandlerFactory {
    type Handler = StreamHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<StreamHandler> {
        let reader = OptionsReader::required(options)?;
        let target = StreamTarget::parse(&reader.required_string("stream")?);
        let mut handler = StreamHandler::new(
            target,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        if let Some(mode) = file_permission(&reader)? {
            handler = handler.with_file_permission(mode);
        }
        decorate(handler, container, &reader)
    }
}
