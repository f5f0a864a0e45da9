use std::sync::Mutex;

use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogRecord, LogResult};

/// Keeps handled records in memory, for assertions in tests.
#[derive(Debug)]
pub struct TestHandler {
    core: HandlerCore,
    records: Mutex<Vec<(LogRecord, String)>>,
}

impl TestHandler {
    /// Creates a handler.
    pub fn new(level: Level, bubble: bool) -> Self {
        TestHandler {
            core: HandlerCore::new(level, bubble),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }

    /// Handled records, after processing.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.iter().map(|(record, _)| record.clone()).collect())
            .unwrap_or_default()
    }

    /// Formatted output of every handled record.
    pub fn formatted(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.iter().map(|(_, line)| line.clone()).collect())
            .unwrap_or_default()
    }

    /// Whether any record of `level` was handled.
    pub fn has_records(&self, level: Level) -> bool {
        self.records().iter().any(|record| record.level == level)
    }

    /// Whether a record with exactly `message` was handled at `level`.
    pub fn has_record(&self, message: &str, level: Level) -> bool {
        self.records()
            .iter()
            .any(|record| record.level == level && record.message == message)
    }

    /// Whether a record containing `needle` was handled at `level`.
    pub fn has_record_that_contains(&self, needle: &str, level: Level) -> bool {
        self.records()
            .iter()
            .any(|record| record.level == level && record.message.contains(needle))
    }

    /// Forgets every handled record.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Default for TestHandler {
    fn default() -> Self {
        TestHandler::new(Level::Debug, true)
    }
}

impl Handler for TestHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        let formatted = self.core.format(&record);
        self.records
            .lock()
            .map_err(|_| crate::LogError::LockPoisoned("TestHandler"))?
            .push((record, formatted));
        Ok(!self.core.bubble())
    }
}

impl_core_handler!(TestHandler);
