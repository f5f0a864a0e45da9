//! # Buffer handler factory

use logwire::handler::BufferHandler;
use logwire::Level;

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handler};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`BufferHandler`]s.
#[derive(Debug)]
pub struct BufferHandlerFactory {}

impl BufferHandlerFactory {
    /// Creates a new BufferHandlerFactory
    pub fn new() -> Self {
        BufferHandlerFactory {}
    }
}

impl Default for BufferHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for BufferHandlerFactory {
    type Handler = BufferHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<BufferHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        let mut handler = BufferHandler::new(
            wrapped,
            reader.usize("buffer_limit", 0)?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
            reader.bool("flush_on_overflow", false)?,
        );
        apply_processors(&mut handler, container, &reader)?;
        Ok(handler)
    }
}
