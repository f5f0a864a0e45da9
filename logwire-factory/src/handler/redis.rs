//! # Redis handler factories
//!
//! Both factories need a `client`: an [`Instance`](crate::Instance) of
//! `Arc<dyn RedisClient>` or the name of a container service holding one.

use std::sync::Arc;

use logwire::handler::{RedisClient, RedisHandler, RedisPubSubHandler};
use logwire::Level;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::resolve::resolve_service;
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

fn client(
    container: &ServiceContainer,
    reader: &OptionsReader<'_>,
) -> FactoryResult<Arc<dyn RedisClient>> {
    resolve_service(container, reader.required_value("client")?, "client", "RedisClient")
}

/// Factory for [`RedisHandler`]s.
#[derive(Debug)]
pub struct RedisHandlerFactory {}

impl RedisHandlerFactory {
    /// Creates a new RedisHandlerFactory
    pub fn new() -> Self {
        RedisHandlerFactory {}
    }
}

impl Default for RedisHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for RedisHandlerFactory {
    type Handler = RedisHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<RedisHandler> {
        let reader = OptionsReader::required(options)?;
        let client = client(container, &reader)?;
        let mut handler = RedisHandler::new(
            client,
            reader.required_string("key")?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        if reader.contains("cap_size") {
            handler = handler.with_cap_size(reader.usize("cap_size", 0)?);
        }
        decorate(handler, container, &reader)
    }
}

/// Factory for [`RedisPubSubHandler`]s. The `key` option names the channel.
#[derive(Debug)]
pub struct RedisPubSubHandlerFactory {}

impl RedisPubSubHandlerFactory {
    /// Creates a new RedisPubSubHandlerFactory
    pub fn new() -> Self {
        RedisPubSubHandlerFactory {}
    }
}

impl Default for RedisPubSubHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for RedisPubSubHandlerFactory {
    type Handler = RedisPubSubHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<RedisPubSubHandler> {
        let reader = OptionsReader::required(options)?;
        let client = client(container, &reader)?;
        let handler = RedisPubSubHandler::new(
            client,
            reader.required_string("key")?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        decorate(handler, container, &reader)
    }
}
