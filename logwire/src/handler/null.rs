use crate::handler::Handler;
use crate::{Level, LogRecord, LogResult};

/// Swallows every record at or above its level, stopping them from bubbling.
#[derive(Clone, Copy, Debug)]
pub struct NullHandler {
    level: Level,
}

impl NullHandler {
    /// Creates a handler discarding records from `level` up.
    pub fn new(level: Level) -> Self {
        NullHandler { level }
    }

    /// Minimum level discarded.
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for NullHandler {
    fn default() -> Self {
        NullHandler::new(Level::Debug)
    }
}

impl Handler for NullHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        record.level >= self.level
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        Ok(record.level >= self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swallows_from_level() {
        let handler = NullHandler::new(Level::Warning);
        assert!(!handler.handle(LogRecord::new("a", Level::Info, "x")).unwrap());
        assert!(handler.handle(LogRecord::new("a", Level::Error, "x")).unwrap());
    }
}
