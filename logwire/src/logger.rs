use std::sync::Arc;

use crate::handler::Handler;
use crate::processor::{Processor, ProcessorStack};
use crate::{Context, Level, LogRecord, LogResult};

/// A named channel dispatching records to its handlers.
///
/// Handlers are kept in dispatch order: the first one added with
/// [`Logger::push_handler`] is the last one asked. Processors run once per
/// record, before any handler sees it.
#[derive(Clone, Debug)]
pub struct Logger {
    name: String,
    handlers: Vec<Arc<dyn Handler>>,
    processors: ProcessorStack,
}

impl Logger {
    /// Creates a logger without handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Logger {
            name: name.into(),
            handlers: Vec::new(),
            processors: ProcessorStack::new(),
        }
    }

    /// The channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A copy of this logger under another channel name.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Logger {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Adds a handler in front of the existing ones.
    pub fn push_handler(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.insert(0, handler);
    }

    /// Removes the first handler.
    pub fn pop_handler(&mut self) -> Option<Arc<dyn Handler>> {
        if self.handlers.is_empty() {
            None
        } else {
            Some(self.handlers.remove(0))
        }
    }

    /// Replaces the handlers; they are asked in the given order.
    pub fn set_handlers(&mut self, handlers: Vec<Arc<dyn Handler>>) {
        self.handlers = handlers;
    }

    /// Handlers in dispatch order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Adds a processor; it runs before the existing ones.
    pub fn push_processor(&mut self, processor: Arc<dyn Processor>) {
        self.processors.push(processor);
    }

    /// Removes the processor that runs first.
    pub fn pop_processor(&mut self) -> Option<Arc<dyn Processor>> {
        self.processors.pop()
    }

    /// Processors in execution order.
    pub fn processors(&self) -> &[Arc<dyn Processor>] {
        self.processors.as_slice()
    }

    /// Whether any handler would handle a record of `level`.
    pub fn is_handling(&self, level: Level) -> bool {
        let probe = LogRecord::new(self.name.clone(), level, "");
        self.handlers.iter().any(|handler| handler.is_handling(&probe))
    }

    /// Dispatches a prepared record. Returns whether any handler saw it.
    pub fn add_record(&self, record: LogRecord) -> LogResult<bool> {
        let Some(first) = self
            .handlers
            .iter()
            .position(|handler| handler.is_handling(&record))
        else {
            return Ok(false);
        };

        let record = self.processors.apply(record);
        for handler in &self.handlers[first..] {
            if handler.handle(record.clone())? {
                break;
            }
        }
        Ok(true)
    }

    /// Logs `message` with `context` at `level`.
    pub fn log(
        &self,
        level: Level,
        message: impl Into<String>,
        context: Context,
    ) -> LogResult<bool> {
        self.add_record(LogRecord::new(self.name.clone(), level, message).with_context(context))
    }

    /// Logs at [`Level::Debug`] without context.
    pub fn debug(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Debug, message, Context::new())
    }

    /// Logs at [`Level::Info`] without context.
    pub fn info(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Info, message, Context::new())
    }

    /// Logs at [`Level::Notice`] without context.
    pub fn notice(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Notice, message, Context::new())
    }

    /// Logs at [`Level::Warning`] without context.
    pub fn warning(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Warning, message, Context::new())
    }

    /// Logs at [`Level::Error`] without context.
    pub fn error(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Error, message, Context::new())
    }

    /// Logs at [`Level::Critical`] without context.
    pub fn critical(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Critical, message, Context::new())
    }

    /// Logs at [`Level::Alert`] without context.
    pub fn alert(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Alert, message, Context::new())
    }

    /// Logs at [`Level::Emergency`] without context.
    pub fn emergency(&self, message: impl Into<String>) -> LogResult<bool> {
        self.log(Level::Emergency, message, Context::new())
    }

    /// Closes every handler, reporting the first failure.
    pub fn close(&self) -> LogResult<()> {
        let mut first_error = None;
        for handler in &self.handlers {
            if let Err(err) = handler.close() {
                crate::logwire_warn!(
                    name: "Logger.HandlerCloseFailed",
                    channel = self.name.as_str(),
                    error = err.to_string()
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{NullHandler, TestHandler};
    use crate::processor::UidProcessor;

    #[test]
    fn stops_at_first_non_bubbling_handler() {
        let last = Arc::new(TestHandler::new(Level::Debug, true));
        let first = Arc::new(TestHandler::new(Level::Error, false));
        let mut logger = Logger::new("app");
        logger.push_handler(last.clone());
        logger.push_handler(first.clone());

        logger.info("routine").unwrap();
        logger.error("broken").unwrap();

        assert!(last.has_record("routine", Level::Info));
        assert!(!last.has_record("broken", Level::Error));
        assert!(first.has_record("broken", Level::Error));
    }

    #[test]
    fn unhandled_records_skip_processors() {
        let sink = Arc::new(TestHandler::new(Level::Error, true));
        let mut logger = Logger::new("app");
        logger.push_handler(sink.clone());
        logger.push_processor(Arc::new(UidProcessor::default()));

        assert!(!logger.debug("ignored").unwrap());
        assert!(logger.critical("seen").unwrap());
        assert!(sink.records()[0].extra.contains_key("uid"));
        assert!(logger.is_handling(Level::Alert));
        assert!(!logger.is_handling(Level::Warning));
    }

    #[test]
    fn null_handler_swallows() {
        let sink = Arc::new(TestHandler::default());
        let mut logger = Logger::new("app");
        logger.set_handlers(vec![Arc::new(NullHandler::default()), sink.clone()]);
        logger.warning("gone").unwrap();
        assert!(sink.records().is_empty());
        assert_eq!(logger.with_name("other").name(), "other");
    }
}
