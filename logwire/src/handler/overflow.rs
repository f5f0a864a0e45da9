use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{Level, LogError, LogRecord, LogResult};

#[derive(Debug, Default)]
struct Counters {
    remaining: HashMap<Level, i64>,
    buffer: HashMap<Level, Vec<LogRecord>>,
}

/// Holds back records of a level until more than its threshold arrived, then
/// forwards the held records and every following one.
///
/// Levels without a threshold are forwarded immediately.
#[derive(Debug)]
pub struct OverflowHandler {
    handler: Arc<dyn Handler>,
    thresholds: HashMap<Level, u32>,
    level: Level,
    bubble: bool,
    counters: Mutex<Counters>,
    processors: ProcessorStack,
}

impl OverflowHandler {
    /// Creates a handler with per level `thresholds`.
    pub fn new(
        handler: Arc<dyn Handler>,
        thresholds: HashMap<Level, u32>,
        level: Level,
        bubble: bool,
    ) -> Self {
        let remaining = thresholds
            .iter()
            .map(|(level, threshold)| (*level, i64::from(*threshold)))
            .collect();
        OverflowHandler {
            handler,
            thresholds,
            level,
            bubble,
            counters: Mutex::new(Counters {
                remaining,
                buffer: HashMap::new(),
            }),
            processors: ProcessorStack::new(),
        }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Configured thresholds.
    pub fn thresholds(&self) -> &HashMap<Level, u32> {
        &self.thresholds
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }
}

impl Handler for OverflowHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        record.level >= self.level
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.processors.apply(record);

        let released = {
            let mut counters = self
                .counters
                .lock()
                .map_err(|_| LogError::LockPoisoned("OverflowHandler"))?;
            let Counters { remaining, buffer } = &mut *counters;
            let left = remaining.entry(record.level).or_insert(0);
            if *left > 0 {
                *left -= 1;
                buffer.entry(record.level).or_default().push(record);
                return Ok(!self.bubble);
            }
            if *left == 0 {
                *left -= 1;
                buffer.remove(&record.level).unwrap_or_default()
            } else {
                Vec::new()
            }
        };

        for held in released {
            self.handler.handle(held)?;
        }
        self.handler.handle(record)?;
        Ok(!self.bubble)
    }

    fn close(&self) -> LogResult<()> {
        self.handler.close()
    }
}

impl_processable_wrapper!(OverflowHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TestHandler;

    #[test]
    fn holds_records_until_threshold_is_exceeded() {
        let sink = Arc::new(TestHandler::default());
        let handler = OverflowHandler::new(
            sink.clone(),
            HashMap::from([(Level::Warning, 2)]),
            Level::Debug,
            true,
        );

        handler.handle(LogRecord::new("app", Level::Warning, "w1")).unwrap();
        handler.handle(LogRecord::new("app", Level::Warning, "w2")).unwrap();
        assert!(sink.records().is_empty());

        handler.handle(LogRecord::new("app", Level::Warning, "w3")).unwrap();
        handler.handle(LogRecord::new("app", Level::Warning, "w4")).unwrap();
        let messages: Vec<String> = sink.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["w1", "w2", "w3", "w4"]);
    }

    #[test]
    fn levels_without_threshold_pass_through() {
        let sink = Arc::new(TestHandler::default());
        let handler = OverflowHandler::new(sink.clone(), HashMap::new(), Level::Info, false);

        assert!(!handler.handle(LogRecord::new("app", Level::Debug, "low")).unwrap());
        assert!(handler.handle(LogRecord::new("app", Level::Error, "now")).unwrap());
        assert_eq!(sink.records().len(), 1);
    }
}
