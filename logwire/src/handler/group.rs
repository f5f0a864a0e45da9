use std::sync::Arc;

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{LogRecord, LogResult};

/// Forwards every record to all of its handlers.
///
/// Errors of a member handler abort the dispatch and are returned.
#[derive(Debug)]
pub struct GroupHandler {
    handlers: Vec<Arc<dyn Handler>>,
    bubble: bool,
    processors: ProcessorStack,
}

impl GroupHandler {
    /// Creates a group.
    pub fn new(handlers: Vec<Arc<dyn Handler>>, bubble: bool) -> Self {
        GroupHandler {
            handlers,
            bubble,
            processors: ProcessorStack::new(),
        }
    }

    /// Member handlers, in dispatch order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }
}

impl Handler for GroupHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.handlers.iter().any(|handler| handler.is_handling(record))
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        let record = self.processors.apply(record);
        for handler in &self.handlers {
            if handler.is_handling(&record) {
                handler.handle(record.clone())?;
            }
        }
        Ok(!self.bubble)
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let records: Vec<LogRecord> = records
            .into_iter()
            .map(|record| self.processors.apply(record))
            .collect();
        for handler in &self.handlers {
            handler.handle_batch(records.clone())?;
        }
        Ok(())
    }

    fn close(&self) -> LogResult<()> {
        for handler in &self.handlers {
            handler.close()?;
        }
        Ok(())
    }
}

impl_processable_wrapper!(GroupHandler);

/// A [`GroupHandler`] that keeps going when a member fails.
///
/// Failures are reported through internal logging and otherwise ignored.
#[derive(Debug)]
pub struct WhatFailureGroupHandler {
    handlers: Vec<Arc<dyn Handler>>,
    bubble: bool,
    processors: ProcessorStack,
}

impl WhatFailureGroupHandler {
    /// Creates a group.
    pub fn new(handlers: Vec<Arc<dyn Handler>>, bubble: bool) -> Self {
        WhatFailureGroupHandler {
            handlers,
            bubble,
            processors: ProcessorStack::new(),
        }
    }

    /// Member handlers, in dispatch order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }
}

impl Handler for WhatFailureGroupHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.handlers.iter().any(|handler| handler.is_handling(record))
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        let record = self.processors.apply(record);
        for handler in &self.handlers {
            if !handler.is_handling(&record) {
                continue;
            }
            if let Err(err) = handler.handle(record.clone()) {
                crate::logwire_warn!(
                    name: "WhatFailureGroupHandler.HandlerFailed",
                    error = err.to_string()
                );
            }
        }
        Ok(!self.bubble)
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let records: Vec<LogRecord> = records
            .into_iter()
            .map(|record| self.processors.apply(record))
            .collect();
        for handler in &self.handlers {
            if let Err(err) = handler.handle_batch(records.clone()) {
                crate::logwire_warn!(
                    name: "WhatFailureGroupHandler.HandlerFailed",
                    error = err.to_string()
                );
            }
        }
        Ok(())
    }

    fn close(&self) -> LogResult<()> {
        for handler in &self.handlers {
            if let Err(err) = handler.close() {
                crate::logwire_warn!(
                    name: "WhatFailureGroupHandler.CloseFailed",
                    error = err.to_string()
                );
            }
        }
        Ok(())
    }
}

impl_processable_wrapper!(WhatFailureGroupHandler);

/// Tries its handlers in order and stops at the first one that succeeds.
#[derive(Debug)]
pub struct FallbackGroupHandler {
    handlers: Vec<Arc<dyn Handler>>,
    bubble: bool,
    processors: ProcessorStack,
}

impl FallbackGroupHandler {
    /// Creates a group.
    pub fn new(handlers: Vec<Arc<dyn Handler>>, bubble: bool) -> Self {
        FallbackGroupHandler {
            handlers,
            bubble,
            processors: ProcessorStack::new(),
        }
    }

    /// Member handlers, in fallback order.
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }
}

impl Handler for FallbackGroupHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.handlers.iter().any(|handler| handler.is_handling(record))
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        let record = self.processors.apply(record);
        for handler in &self.handlers {
            match handler.handle(record.clone()) {
                Ok(_) => break,
                Err(err) => {
                    crate::logwire_warn!(
                        name: "FallbackGroupHandler.HandlerFailed",
                        error = err.to_string()
                    );
                }
            }
        }
        Ok(!self.bubble)
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let records: Vec<LogRecord> = records
            .into_iter()
            .map(|record| self.processors.apply(record))
            .collect();
        for handler in &self.handlers {
            match handler.handle_batch(records.clone()) {
                Ok(()) => break,
                Err(err) => {
                    crate::logwire_warn!(
                        name: "FallbackGroupHandler.HandlerFailed",
                        error = err.to_string()
                    );
                }
            }
        }
        Ok(())
    }

    fn close(&self) -> LogResult<()> {
        for handler in &self.handlers {
            handler.close()?;
        }
        Ok(())
    }
}

impl_processable_wrapper!(FallbackGroupHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::FailingHandler;
    use crate::handler::{ProcessableHandler, TestHandler};
    use crate::processor::TagProcessor;
    use crate::Level;

    #[test]
    fn group_forwards_to_interested_handlers() {
        let info = Arc::new(TestHandler::new(Level::Info, true));
        let error = Arc::new(TestHandler::new(Level::Error, true));
        let mut group = GroupHandler::new(vec![info.clone(), error.clone()], false);
        group.push_processor(Arc::new(TagProcessor::new(vec!["web".into()])));

        assert!(group.handle(LogRecord::new("app", Level::Warning, "slow")).unwrap());
        assert_eq!(info.records().len(), 1);
        assert!(error.records().is_empty());
        assert_eq!(info.records()[0].extra["tags"], serde_json::json!(["web"]));
    }

    #[test]
    fn group_propagates_failures() {
        let group = GroupHandler::new(vec![Arc::new(FailingHandler::default())], true);
        assert!(group.handle(LogRecord::new("app", Level::Info, "x")).is_err());
    }

    #[test]
    fn whatfailure_group_keeps_going() {
        let failing = Arc::new(FailingHandler::default());
        let sink = Arc::new(TestHandler::default());
        let group = WhatFailureGroupHandler::new(vec![failing.clone(), sink.clone()], true);

        assert!(!group.handle(LogRecord::new("app", Level::Info, "x")).unwrap());
        assert_eq!(*failing.attempts.lock().unwrap(), 1);
        assert!(sink.has_record("x", Level::Info));
    }

    #[test]
    fn fallback_group_stops_at_first_success() {
        let failing = Arc::new(FailingHandler::default());
        let primary = Arc::new(TestHandler::default());
        let secondary = Arc::new(TestHandler::default());
        let group = FallbackGroupHandler::new(
            vec![failing.clone(), primary.clone(), secondary.clone()],
            true,
        );

        group.handle(LogRecord::new("app", Level::Info, "x")).unwrap();
        assert_eq!(*failing.attempts.lock().unwrap(), 1);
        assert_eq!(primary.records().len(), 1);
        assert!(secondary.records().is_empty());
    }

    #[test]
    fn fallback_group_batches_skip_failing_handlers() {
        let failing = Arc::new(FailingHandler::default());
        let sink = Arc::new(TestHandler::default());
        let group = FallbackGroupHandler::new(vec![failing.clone(), sink.clone()], true);

        group
            .handle_batch(vec![
                LogRecord::new("app", Level::Info, "a"),
                LogRecord::new("app", Level::Error, "b"),
            ])
            .unwrap();
        assert_eq!(sink.records().len(), 2);

        let only_failing = FallbackGroupHandler::new(vec![failing], true);
        assert!(only_failing
            .handle(LogRecord::new("app", Level::Info, "c"))
            .is_ok());
    }
}
