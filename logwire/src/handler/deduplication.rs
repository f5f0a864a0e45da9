use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{Level, LogError, LogRecord, LogResult};

/// Buffers records and, on flush, forwards the whole buffer only when it
/// holds a record at or above `deduplication_level` that was not already
/// seen within the last `time` seconds.
///
/// Seen records are kept in a store file, one `timestamp:LEVEL:message` line
/// per record, so duplicates are detected across processes.
#[derive(Debug)]
pub struct DeduplicationHandler {
    handler: Arc<dyn Handler>,
    store: PathBuf,
    deduplication_level: Level,
    time: u64,
    bubble: bool,
    buffer: Mutex<Vec<LogRecord>>,
    processors: ProcessorStack,
}

impl DeduplicationHandler {
    /// Seconds during which a record counts as a duplicate by default.
    pub const DEFAULT_TIME: u64 = 60;

    /// Creates a handler. Without a `store`, `logwire-dedup.log` in the
    /// temporary directory is used.
    pub fn new(
        handler: Arc<dyn Handler>,
        store: Option<PathBuf>,
        deduplication_level: Level,
        time: u64,
        bubble: bool,
    ) -> Self {
        DeduplicationHandler {
            handler,
            store: store.unwrap_or_else(|| std::env::temp_dir().join("logwire-dedup.log")),
            deduplication_level,
            time,
            bubble,
            buffer: Mutex::new(Vec::new()),
            processors: ProcessorStack::new(),
        }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// The store file.
    pub fn store(&self) -> &Path {
        &self.store
    }

    /// Records below this level never trigger a flush.
    pub fn deduplication_level(&self) -> Level {
        self.deduplication_level
    }

    /// Duplicate window, in seconds.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }

    fn entry(record: &LogRecord) -> String {
        format!(
            "{}:{}:{}",
            record.datetime.timestamp(),
            record.level.name(),
            record.message.replace(['\r', '\n'], " ")
        )
    }

    fn is_duplicate(store: &[String], record: &LogRecord, time: u64) -> bool {
        let earliest = record
            .datetime
            .timestamp()
            .saturating_sub(i64::try_from(time).unwrap_or(i64::MAX));
        let expected = format!(
            "{}:{}",
            record.level.name(),
            record.message.replace(['\r', '\n'], " ")
        );
        store.iter().rev().any(|line| {
            line.split_once(':').is_some_and(|(timestamp, rest)| {
                rest == expected && timestamp.parse::<i64>().is_ok_and(|ts| ts >= earliest)
            })
        })
    }

    fn read_store(&self) -> LogResult<Vec<String>> {
        match std::fs::read_to_string(&self.store) {
            Ok(content) => Ok(content.lines().map(str::to_owned).collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(LogError::io(self.store.display().to_string(), err)),
        }
    }

    /// Drops store entries older than the duplicate window relative to `now`.
    fn collect_garbage(&self, lines: &[String], now: i64) -> LogResult<()> {
        let earliest = now.saturating_sub(i64::try_from(self.time).unwrap_or(i64::MAX));
        let kept: Vec<&str> = lines
            .iter()
            .filter(|line| {
                line.split_once(':')
                    .and_then(|(timestamp, _)| timestamp.parse::<i64>().ok())
                    .is_some_and(|ts| ts >= earliest)
            })
            .map(String::as_str)
            .collect();
        if kept.len() == lines.len() {
            return Ok(());
        }
        let mut content = kept.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(&self.store, content)
            .map_err(|err| LogError::io(self.store.display().to_string(), err))
    }

    /// Forwards the buffer if it holds a new record at or above the
    /// deduplication level, then empties it.
    pub fn flush(&self) -> LogResult<()> {
        let records = {
            let mut buffer = self
                .buffer
                .lock()
                .map_err(|_| LogError::LockPoisoned("DeduplicationHandler"))?;
            std::mem::take(&mut *buffer)
        };
        if records.is_empty() {
            return Ok(());
        }

        let mut store = self.read_store()?;
        let mut passthru = false;
        let mut new_entries = Vec::new();
        for record in records
            .iter()
            .filter(|record| record.level >= self.deduplication_level)
        {
            if !Self::is_duplicate(&store, record, self.time) {
                let entry = Self::entry(record);
                store.push(entry.clone());
                new_entries.push(entry);
                passthru = true;
            }
        }
        if !passthru {
            return Ok(());
        }

        if let Some(parent) = self.store.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|err| LogError::io(parent.display().to_string(), err))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.store)
            .map_err(|err| LogError::io(self.store.display().to_string(), err))?;
        for entry in &new_entries {
            writeln!(file, "{entry}")
                .map_err(|err| LogError::io(self.store.display().to_string(), err))?;
        }
        drop(file);

        let now = records
            .iter()
            .map(|record| record.datetime.timestamp())
            .max()
            .unwrap_or_default();
        self.collect_garbage(&store, now)?;

        self.handler.handle_batch(records)
    }
}

impl Handler for DeduplicationHandler {
    fn is_handling(&self, _record: &LogRecord) -> bool {
        true
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        let record = self.processors.apply(record);
        self.buffer
            .lock()
            .map_err(|_| LogError::LockPoisoned("DeduplicationHandler"))?
            .push(record);
        Ok(!self.bubble)
    }

    fn close(&self) -> LogResult<()> {
        self.flush()?;
        self.handler.close()
    }
}

impl Drop for DeduplicationHandler {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            crate::logwire_warn!(
                name: "DeduplicationHandler.FlushOnDropFailed",
                error = err.to_string()
            );
        }
    }
}

impl_processable_wrapper!(DeduplicationHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TestHandler;
    use chrono::{TimeZone, Utc};

    fn record(level: Level, message: &str, second: u32) -> LogRecord {
        LogRecord::new("app", level, message)
            .with_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap())
    }

    #[test]
    fn forwards_buffer_only_for_new_errors() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(TestHandler::default());
        let handler = DeduplicationHandler::new(
            sink.clone(),
            Some(dir.path().join("dedup.log")),
            Level::Error,
            60,
            true,
        );

        handler.handle(record(Level::Debug, "context", 0)).unwrap();
        handler.handle(record(Level::Error, "db down", 1)).unwrap();
        handler.flush().unwrap();
        assert_eq!(sink.records().len(), 2);

        handler.handle(record(Level::Error, "db down", 20)).unwrap();
        handler.flush().unwrap();
        assert_eq!(sink.records().len(), 2);

        handler.handle(record(Level::Info, "just info", 30)).unwrap();
        handler.flush().unwrap();
        assert_eq!(sink.records().len(), 2);

        let store = std::fs::read_to_string(dir.path().join("dedup.log")).unwrap();
        assert_eq!(store.lines().count(), 1);
        assert!(store.ends_with(":ERROR:db down\n"));
    }

    #[test]
    fn duplicates_expire_after_time_window() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(TestHandler::default());
        let handler = DeduplicationHandler::new(
            sink.clone(),
            Some(dir.path().join("dedup.log")),
            Level::Error,
            5,
            true,
        );

        handler.handle(record(Level::Critical, "again", 0)).unwrap();
        handler.flush().unwrap();
        handler.handle(record(Level::Critical, "again", 10)).unwrap();
        handler.close().unwrap();

        assert_eq!(sink.records().len(), 2);
        let store = std::fs::read_to_string(dir.path().join("dedup.log")).unwrap();
        assert_eq!(store.lines().count(), 1);
    }
}
