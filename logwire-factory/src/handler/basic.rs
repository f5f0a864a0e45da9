//! # Null and test handler factories

use logwire::handler::{NullHandler, TestHandler};
use logwire::Level;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`NullHandler`]s.
#[derive(Debug)]
pub struct NullHandlerFactory {}

impl NullHandlerFactory {
    /// Creates a new NullHandlerFactory
    pub fn new() -> Self {
        NullHandlerFactory {}
    }
}

impl Default for NullHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for NullHandlerFactory {
    type Handler = NullHandler;

    fn create_handler(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<NullHandler> {
        let reader = OptionsReader::optional(options)?;
        Ok(NullHandler::new(reader.level("level", Level::Debug)?))
    }
}

/// Factory for [`TestHandler`]s.
#[derive(Debug)]
pub struct TestHandlerFactory {}

impl TestHandlerFactory {
    /// Creates a new TestHandlerFactory
    pub fn new() -> Self {
        TestHandlerFactory {}
    }
}

impl Default for TestHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for TestHandlerFactory {
    type Handler = TestHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<TestHandler> {
        let reader = OptionsReader::optional(options)?;
        let handler = TestHandler::new(
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        decorate(handler, container, &reader)
    }
}
