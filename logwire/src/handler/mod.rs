//! # Handlers
//!
//! A [`Handler`] decides whether it is interested in a record, writes it to
//! its destination and reports whether the record should keep bubbling to
//! the next handler of the [`Logger`](crate::Logger).
//!
//! Two families are provided:
//!
//! - **Sinks** write records out: [`NullHandler`], [`TestHandler`],
//!   [`StreamHandler`], [`RotatingFileHandler`], [`SocketHandler`],
//!   [`RedisHandler`], [`RedisPubSubHandler`], [`AmqpHandler`],
//!   [`MailerHandler`] and, with the `otel` feature, [`OpenTelemetryHandler`].
//! - **Wrappers** decorate other handlers: [`GroupHandler`],
//!   [`WhatFailureGroupHandler`], [`FallbackGroupHandler`], [`BufferHandler`],
//!   [`FilterHandler`], [`FingersCrossedHandler`], [`SamplingHandler`],
//!   [`DeduplicationHandler`] and [`OverflowHandler`].
//!
//! Sinks share their level, bubbling flag, formatter and processors through
//! [`HandlerCore`].

mod activation;
mod amqp;
mod buffer;
mod deduplication;
mod filter;
mod fingers_crossed;
mod group;
mod mailer;
mod null;
#[cfg(feature = "otel")]
mod otel;
mod overflow;
mod redis;
mod rotating_file;
mod sampling;
mod socket;
mod stream;
mod testing;

pub use activation::{
    ActivationStrategy, ChannelLevelActivationStrategy, ErrorLevelActivationStrategy,
};
pub use amqp::{AmqpHandler, MessagePublisher};
pub use buffer::BufferHandler;
pub use deduplication::DeduplicationHandler;
pub use filter::FilterHandler;
pub use fingers_crossed::FingersCrossedHandler;
pub use group::{FallbackGroupHandler, GroupHandler, WhatFailureGroupHandler};
pub use mailer::{MailMessage, Mailer, MailerHandler};
pub use null::NullHandler;
#[cfg(feature = "otel")]
pub use otel::OpenTelemetryHandler;
pub use overflow::OverflowHandler;
pub use redis::{RedisClient, RedisHandler, RedisPubSubHandler};
pub use rotating_file::{RotatingFileHandler, FILE_PER_DAY, FILE_PER_MONTH, FILE_PER_YEAR};
pub use sampling::SamplingHandler;
pub use socket::SocketHandler;
pub use stream::{StreamHandler, StreamTarget};
pub use testing::TestHandler;

use std::fmt::Debug;
use std::sync::Arc;

use crate::formatter::{Formatter, LineFormatter};
use crate::processor::{Processor, ProcessorStack};
use crate::{Level, LogRecord, LogResult};

/// A log sink or a decorator around other sinks.
pub trait Handler: Send + Sync + Debug {
    /// Whether [`Handler::handle`] would act on the record.
    fn is_handling(&self, record: &LogRecord) -> bool;

    /// Handles the record. Returns `true` when the record must not bubble to
    /// the next handler.
    fn handle(&self, record: LogRecord) -> LogResult<bool>;

    /// Handles a batch of records at once.
    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        for record in records {
            self.handle(record)?;
        }
        Ok(())
    }

    /// Flushes and releases resources. Handlers may be used again afterwards.
    fn close(&self) -> LogResult<()> {
        Ok(())
    }
}

/// Handlers whose output representation can be replaced.
pub trait FormattableHandler: Handler {
    /// Replaces the formatter.
    fn set_formatter(&mut self, formatter: Arc<dyn Formatter>);

    /// The formatter in use.
    fn formatter(&self) -> Arc<dyn Formatter>;
}

/// Handlers running their own processors before handling a record.
pub trait ProcessableHandler: Handler {
    /// Adds a processor on top of the handler's stack; it runs first.
    fn push_processor(&mut self, processor: Arc<dyn Processor>);

    /// Removes the processor on top of the stack.
    fn pop_processor(&mut self) -> Option<Arc<dyn Processor>>;

    /// Processors in execution order.
    fn processors(&self) -> &[Arc<dyn Processor>];
}

/// State shared by every sink: minimum level, bubbling, formatter, processors.
#[derive(Clone, Debug)]
pub struct HandlerCore {
    level: Level,
    bubble: bool,
    formatter: Arc<dyn Formatter>,
    processors: ProcessorStack,
}

impl HandlerCore {
    /// Creates a core formatting with a [`LineFormatter`].
    pub fn new(level: Level, bubble: bool) -> Self {
        HandlerCore::with_default_formatter(level, bubble, Arc::new(LineFormatter::default()))
    }

    /// Creates a core with a handler specific default formatter.
    pub fn with_default_formatter(
        level: Level,
        bubble: bool,
        formatter: Arc<dyn Formatter>,
    ) -> Self {
        HandlerCore {
            level,
            bubble,
            formatter,
            processors: ProcessorStack::new(),
        }
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }

    /// Whether the record reaches the minimum level.
    pub fn is_handling(&self, record: &LogRecord) -> bool {
        record.level >= self.level
    }

    /// Runs the processors over the record.
    pub fn process(&self, record: LogRecord) -> LogRecord {
        self.processors.apply(record)
    }

    /// Formats the record.
    pub fn format(&self, record: &LogRecord) -> String {
        self.formatter.format(record)
    }

    /// The formatter in use.
    pub fn formatter(&self) -> Arc<dyn Formatter> {
        Arc::clone(&self.formatter)
    }

    /// Replaces the formatter.
    pub fn set_formatter(&mut self, formatter: Arc<dyn Formatter>) {
        self.formatter = formatter;
    }

    /// The processor stack.
    pub fn processors(&self) -> &ProcessorStack {
        &self.processors
    }

    /// The processor stack, mutably.
    pub fn processors_mut(&mut self) -> &mut ProcessorStack {
        &mut self.processors
    }
}

/// Implements [`FormattableHandler`] and [`ProcessableHandler`] for a sink
/// keeping its state in a `core: HandlerCore` field.
macro_rules! impl_core_handler {
    ($handler:ty) => {
        impl $crate::handler::FormattableHandler for $handler {
            fn set_formatter(
                &mut self,
                formatter: ::std::sync::Arc<dyn $crate::formatter::Formatter>,
            ) {
                self.core.set_formatter(formatter);
            }

            fn formatter(&self) -> ::std::sync::Arc<dyn $crate::formatter::Formatter> {
                self.core.formatter()
            }
        }

        impl $crate::handler::ProcessableHandler for $handler {
            fn push_processor(
                &mut self,
                processor: ::std::sync::Arc<dyn $crate::processor::Processor>,
            ) {
                self.core.processors_mut().push(processor);
            }

            fn pop_processor(
                &mut self,
            ) -> Option<::std::sync::Arc<dyn $crate::processor::Processor>> {
                self.core.processors_mut().pop()
            }

            fn processors(&self) -> &[::std::sync::Arc<dyn $crate::processor::Processor>] {
                self.core.processors().as_slice()
            }
        }
    };
}

/// Implements [`ProcessableHandler`] for a wrapper keeping its processors in
/// a `processors: ProcessorStack` field.
macro_rules! impl_processable_wrapper {
    ($handler:ty) => {
        impl $crate::handler::ProcessableHandler for $handler {
            fn push_processor(
                &mut self,
                processor: ::std::sync::Arc<dyn $crate::processor::Processor>,
            ) {
                self.processors.push(processor);
            }

            fn pop_processor(
                &mut self,
            ) -> Option<::std::sync::Arc<dyn $crate::processor::Processor>> {
                self.processors.pop()
            }

            fn processors(&self) -> &[::std::sync::Arc<dyn $crate::processor::Processor>] {
                self.processors.as_slice()
            }
        }
    };
}

pub(crate) use impl_core_handler;
pub(crate) use impl_processable_wrapper;
