use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{Level, LogError, LogRecord, LogResult};

/// Buffers records and hands them to the wrapped handler as one batch when
/// closed, flushed, or dropped.
///
/// With a `buffer_limit`, the oldest record is discarded once the buffer is
/// full, unless `flush_on_overflow` is set, in which case the full buffer is
/// flushed first.
#[derive(Debug)]
pub struct BufferHandler {
    handler: Arc<dyn Handler>,
    level: Level,
    bubble: bool,
    buffer_limit: usize,
    flush_on_overflow: bool,
    buffer: Mutex<VecDeque<LogRecord>>,
    processors: ProcessorStack,
}

impl BufferHandler {
    /// Creates a buffer. `buffer_limit = 0` never discards records.
    pub fn new(
        handler: Arc<dyn Handler>,
        buffer_limit: usize,
        level: Level,
        bubble: bool,
        flush_on_overflow: bool,
    ) -> Self {
        BufferHandler {
            handler,
            level,
            bubble,
            buffer_limit,
            flush_on_overflow,
            buffer: Mutex::new(VecDeque::new()),
            processors: ProcessorStack::new(),
        }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Minimum level buffered.
    pub fn level(&self) -> Level {
        self.level
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }

    /// Maximum number of buffered records, 0 when unlimited.
    pub fn buffer_limit(&self) -> usize {
        self.buffer_limit
    }

    /// Whether a full buffer is flushed instead of dropping its oldest record.
    pub fn flushes_on_overflow(&self) -> bool {
        self.flush_on_overflow
    }

    fn lock(&self) -> LogResult<MutexGuard<'_, VecDeque<LogRecord>>> {
        self.buffer
            .lock()
            .map_err(|_| LogError::LockPoisoned("BufferHandler"))
    }

    /// Number of buffered records.
    pub fn len(&self) -> LogResult<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> LogResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Sends the buffered records to the wrapped handler.
    pub fn flush(&self) -> LogResult<()> {
        let records: Vec<LogRecord> = self.lock()?.drain(..).collect();
        if records.is_empty() {
            return Ok(());
        }
        self.handler.handle_batch(records)
    }

    /// Drops the buffered records.
    pub fn clear(&self) -> LogResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

impl Handler for BufferHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        record.level >= self.level
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.processors.apply(record);
        let overflow = {
            let mut buffer = self.lock()?;
            let mut overflow = Vec::new();
            if self.buffer_limit > 0 && buffer.len() >= self.buffer_limit {
                if self.flush_on_overflow {
                    overflow.extend(buffer.drain(..));
                } else {
                    buffer.pop_front();
                }
            }
            buffer.push_back(record);
            overflow
        };
        if !overflow.is_empty() {
            self.handler.handle_batch(overflow)?;
        }
        Ok(!self.bubble)
    }

    fn close(&self) -> LogResult<()> {
        self.flush()?;
        self.handler.close()
    }
}

impl Drop for BufferHandler {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            crate::logwire_warn!(name: "BufferHandler.FlushOnDropFailed", error = err.to_string());
        }
    }
}

impl_processable_wrapper!(BufferHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{NullHandler, TestHandler};

    fn record(message: &str) -> LogRecord {
        LogRecord::new("app", Level::Info, message)
    }

    #[test]
    fn flushes_on_close() {
        let sink = Arc::new(TestHandler::default());
        let buffer = BufferHandler::new(sink.clone(), 0, Level::Debug, true, false);

        buffer.handle(record("a")).unwrap();
        buffer.handle(record("b")).unwrap();
        assert!(sink.records().is_empty());

        buffer.close().unwrap();
        assert_eq!(sink.records().len(), 2);
        assert!(buffer.is_empty().unwrap());
    }

    #[test]
    fn drops_oldest_when_full() {
        let sink = Arc::new(TestHandler::default());
        let buffer = BufferHandler::new(sink.clone(), 2, Level::Debug, true, false);
        for message in ["a", "b", "c"] {
            buffer.handle(record(message)).unwrap();
        }
        buffer.flush().unwrap();

        let messages: Vec<String> = sink.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
    }

    #[test]
    fn flushes_when_full_if_asked() {
        let sink = Arc::new(TestHandler::default());
        let buffer = BufferHandler::new(sink.clone(), 2, Level::Debug, true, true);
        for message in ["a", "b", "c"] {
            buffer.handle(record(message)).unwrap();
        }
        assert_eq!(sink.records().len(), 2);
        assert_eq!(buffer.len().unwrap(), 1);
    }

    #[test]
    fn concurrent_flush_and_handle() {
        let buffer = BufferHandler::new(
            Arc::new(NullHandler::new(Level::Debug)),
            1,
            Level::Debug,
            true,
            false,
        );
        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..10_000 {
                    buffer.flush().unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..10_000 {
                    buffer.handle(record("racing")).unwrap();
                }
            });
        });
        assert!(buffer.len().unwrap() <= 1);
    }

    #[test]
    fn concurrent_overflow_flushes_every_record() {
        let sink = Arc::new(TestHandler::default());
        let buffer = BufferHandler::new(sink.clone(), 3, Level::Debug, true, true);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        buffer.handle(record("shared")).unwrap();
                    }
                });
            }
        });
        buffer.close().unwrap();
        assert_eq!(sink.records().len(), 1000);
    }

    #[test]
    fn flushes_on_drop() {
        let sink = Arc::new(TestHandler::default());
        {
            let buffer = BufferHandler::new(sink.clone(), 0, Level::Warning, true, false);
            buffer.handle(record("too low")).unwrap();
            buffer
                .handle(LogRecord::new("app", Level::Error, "kept"))
                .unwrap();
        }
        assert!(sink.has_record("kept", Level::Error));
        assert_eq!(sink.records().len(), 1);
    }
}
