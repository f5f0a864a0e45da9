use std::fmt::Debug;
use std::sync::Arc;

use crate::formatter::{BatchMode, JsonFormatter};
use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogRecord, LogResult};

/// Publishes messages to an AMQP exchange.
pub trait MessagePublisher: Send + Sync + Debug {
    /// Publishes `body` to `exchange` with `routing_key`.
    fn publish(&self, exchange: &str, routing_key: &str, body: &str) -> LogResult<()>;
}

/// Publishes records as JSON to an exchange, routed by
/// `<level>.<channel>` (e.g. `error.payments`).
#[derive(Debug)]
pub struct AmqpHandler {
    core: HandlerCore,
    publisher: Arc<dyn MessagePublisher>,
    exchange_name: String,
}

impl AmqpHandler {
    /// Exchange used when none is configured.
    pub const DEFAULT_EXCHANGE: &'static str = "log";

    /// Creates a handler.
    pub fn new(
        publisher: Arc<dyn MessagePublisher>,
        exchange_name: Option<String>,
        level: Level,
        bubble: bool,
    ) -> Self {
        AmqpHandler {
            core: HandlerCore::with_default_formatter(
                level,
                bubble,
                Arc::new(JsonFormatter::new(BatchMode::Json, false)),
            ),
            publisher,
            exchange_name: exchange_name.unwrap_or_else(|| Self::DEFAULT_EXCHANGE.to_owned()),
        }
    }

    /// The publisher.
    pub fn publisher(&self) -> &Arc<dyn MessagePublisher> {
        &self.publisher
    }

    /// The exchange records are published to.
    pub fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }

    fn routing_key(record: &LogRecord) -> String {
        format!("{}.{}", record.level.name().to_lowercase(), record.channel)
    }
}

impl Handler for AmqpHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.publisher.publish(
            &self.exchange_name,
            &Self::routing_key(&record),
            &self.core.format(&record),
        )?;
        Ok(!self.core.bubble())
    }
}

impl_core_handler!(AmqpHandler);
