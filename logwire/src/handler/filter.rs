use std::sync::Arc;

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{Level, LogRecord, LogResult};

/// Only lets records of selected levels through to the wrapped handler.
#[derive(Debug)]
pub struct FilterHandler {
    handler: Arc<dyn Handler>,
    accepted_levels: Vec<Level>,
    bubble: bool,
    processors: ProcessorStack,
}

impl FilterHandler {
    /// Accepts every level from `min_level` to `max_level`, both inclusive.
    pub fn with_range(
        handler: Arc<dyn Handler>,
        min_level: Level,
        max_level: Level,
        bubble: bool,
    ) -> Self {
        let levels = Level::ALL
            .into_iter()
            .filter(|level| *level >= min_level && *level <= max_level)
            .collect();
        FilterHandler::with_levels(handler, levels, bubble)
    }

    /// Accepts exactly `levels`.
    pub fn with_levels(handler: Arc<dyn Handler>, mut levels: Vec<Level>, bubble: bool) -> Self {
        levels.sort();
        levels.dedup();
        FilterHandler {
            handler,
            accepted_levels: levels,
            bubble,
            processors: ProcessorStack::new(),
        }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Accepted levels, lowest first.
    pub fn accepted_levels(&self) -> &[Level] {
        &self.accepted_levels
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }
}

impl Handler for FilterHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.accepted_levels.contains(&record.level)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        self.handler.handle(self.processors.apply(record))?;
        Ok(!self.bubble)
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let accepted: Vec<LogRecord> = records
            .into_iter()
            .filter(|record| self.is_handling(record))
            .map(|record| self.processors.apply(record))
            .collect();
        if accepted.is_empty() {
            return Ok(());
        }
        self.handler.handle_batch(accepted)
    }

    fn close(&self) -> LogResult<()> {
        self.handler.close()
    }
}

impl_processable_wrapper!(FilterHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TestHandler;

    #[test]
    fn range_is_inclusive() {
        let sink = Arc::new(TestHandler::default());
        let filter = FilterHandler::with_range(sink.clone(), Level::Notice, Level::Error, true);
        assert_eq!(
            filter.accepted_levels(),
            &[Level::Notice, Level::Warning, Level::Error]
        );

        for level in Level::ALL {
            filter.handle(LogRecord::new("app", level, level.name())).unwrap();
        }
        assert_eq!(sink.records().len(), 3);
        assert!(!sink.has_records(Level::Critical));
    }

    #[test]
    fn explicit_levels() {
        let sink = Arc::new(TestHandler::default());
        let filter =
            FilterHandler::with_levels(sink.clone(), vec![Level::Debug, Level::Alert], false);

        assert!(!filter.handle(LogRecord::new("app", Level::Info, "x")).unwrap());
        assert!(filter.handle(LogRecord::new("app", Level::Alert, "y")).unwrap());
        filter
            .handle_batch(vec![
                LogRecord::new("app", Level::Debug, "a"),
                LogRecord::new("app", Level::Error, "b"),
            ])
            .unwrap();
        assert_eq!(sink.records().len(), 2);
    }
}
