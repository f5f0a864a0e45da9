//! # Handler factories
//!
//! One factory per built-in handler, registered in the handler plugin
//! manager by [`register_defaults`]. Sinks accept the common `level`,
//! `bubble`, `formatter` and `processors` options; wrappers resolve the
//! handler(s) they decorate through the same container.

pub mod amqp;
pub mod basic;
pub mod buffer;
pub mod deduplication;
pub mod filter;
pub mod fingers_crossed;
pub mod group;
pub mod mailer;
#[cfg(feature = "otel")]
pub mod otel;
pub mod overflow;
pub mod redis;
pub mod rotating_file;
pub mod sampling;
pub mod socket;
pub mod stream;

use logwire::{FormattableHandler, ProcessableHandler};

use crate::plugin_manager::HandlerPluginManager;
use crate::resolve::{apply_formatter, apply_processors};
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// Applies the `formatter` and `processors` options shared by every sink.
pub(crate) fn decorate<H>(
    mut handler: H,
    container: &ServiceContainer,
    reader: &OptionsReader<'_>,
) -> FactoryResult<H>
where
    H: FormattableHandler + ProcessableHandler,
{
    apply_formatter(&mut handler, container, reader)?;
    apply_processors(&mut handler, container, reader)?;
    Ok(handler)
}

/// Reads a unix `file_permission`: an integer, or an octal string such as
/// `"0640"`.
pub(crate) fn file_permission(reader: &OptionsReader<'_>) -> FactoryResult<Option<u32>> {
    match reader.get("file_permission") {
        None => Ok(None),
        Some(Value::String(mode)) => {
            let digits = mode.trim().trim_start_matches("0o");
            u32::from_str_radix(digits, 8).map(Some).map_err(|err| {
                FactoryError::not_created_with(
                    format!("file_permission must be an octal mode, got \"{mode}\""),
                    err,
                )
            })
        }
        Some(_) => reader.u32("file_permission", 0).map(Some),
    }
}

/// Registers every built-in handler factory, with aliases for the
/// `CamelCase` names used by other configuration formats.
pub(crate) fn register_defaults(manager: &mut HandlerPluginManager) {
    manager.register_factory("null", basic::NullHandlerFactory::new());
    manager.register_factory("test", basic::TestHandlerFactory::new());
    manager.register_factory("stream", stream::StreamHandlerFactory::new());
    manager.register_factory("rotating_file", rotating_file::RotatingFileHandlerFactory::new());
    manager.register_factory("socket", socket::SocketHandlerFactory::new());
    manager.register_factory("redis", redis::RedisHandlerFactory::new());
    manager.register_factory("redis_pub_sub", redis::RedisPubSubHandlerFactory::new());
    manager.register_factory("amqp", amqp::AmqpHandlerFactory::new());
    manager.register_factory("mailer", mailer::MailerHandlerFactory::new());
    #[cfg(feature = "otel")]
    manager.register_factory("opentelemetry", otel::OpenTelemetryHandlerFactory::new());
    manager.register_factory("group", group::GroupHandlerFactory::new());
    manager.register_factory("whatfailuregroup", group::WhatFailureGroupHandlerFactory::new());
    manager.register_factory("fallbackgroup", group::FallbackGroupHandlerFactory::new());
    manager.register_factory("buffer", buffer::BufferHandlerFactory::new());
    manager.register_factory("filter", filter::FilterHandlerFactory::new());
    manager.register_factory(
        "fingers_crossed",
        fingers_crossed::FingersCrossedHandlerFactory::new(),
    );
    manager.register_factory("sampling", sampling::SamplingHandlerFactory::new());
    manager.register_factory("deduplication", deduplication::DeduplicationHandlerFactory::new());
    manager.register_factory("overflow", overflow::OverflowHandlerFactory::new());

    for (alias, target) in [
        ("NullHandler", "null"),
        ("TestHandler", "test"),
        ("StreamHandler", "stream"),
        ("RotatingFileHandler", "rotating_file"),
        ("SocketHandler", "socket"),
        ("RedisHandler", "redis"),
        ("RedisPubSubHandler", "redis_pub_sub"),
        ("AmqpHandler", "amqp"),
        ("MailerHandler", "mailer"),
        ("GroupHandler", "group"),
        ("WhatFailureGroupHandler", "whatfailuregroup"),
        ("FallbackGroupHandler", "fallbackgroup"),
        ("BufferHandler", "buffer"),
        ("FilterHandler", "filter"),
        ("FingersCrossedHandler", "fingers_crossed"),
        ("SamplingHandler", "sampling"),
        ("DeduplicationHandler", "deduplication"),
        ("OverflowHandler", "overflow"),
    ] {
        manager.alias(alias, target);
    }
    #[cfg(feature = "otel")]
    manager.alias("OpenTelemetryHandler", "opentelemetry");
}
