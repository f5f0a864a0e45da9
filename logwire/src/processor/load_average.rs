use std::path::PathBuf;

use crate::processor::Processor;
use crate::{LogError, LogRecord, LogResult};

/// Which system load average to report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadAverage {
    /// Average over the last minute.
    OneMinute,
    /// Average over the last five minutes.
    FiveMinutes,
    /// Average over the last fifteen minutes.
    FifteenMinutes,
}

impl LoadAverage {
    /// Maps 1, 5 or 15 minutes to a [`LoadAverage`].
    pub fn from_minutes(minutes: u64) -> LogResult<Self> {
        match minutes {
            1 => Ok(LoadAverage::OneMinute),
            5 => Ok(LoadAverage::FiveMinutes),
            15 => Ok(LoadAverage::FifteenMinutes),
            other => Err(LogError::InvalidArgument(format!(
                "invalid average system load {other}, use 1, 5 or 15"
            ))),
        }
    }

    fn index(self) -> usize {
        match self {
            LoadAverage::OneMinute => 0,
            LoadAverage::FiveMinutes => 1,
            LoadAverage::FifteenMinutes => 2,
        }
    }
}

/// Adds the system load average to `extra.load_average`.
///
/// Reads `/proc/loadavg`; when it is unavailable the record is left unchanged.
#[derive(Clone, Debug)]
pub struct LoadAverageProcessor {
    average: LoadAverage,
    source: PathBuf,
}

impl LoadAverageProcessor {
    /// Creates a processor.
    pub fn new(average: LoadAverage) -> Self {
        LoadAverageProcessor {
            average,
            source: PathBuf::from("/proc/loadavg"),
        }
    }

    /// The configured average.
    pub fn average(&self) -> LoadAverage {
        self.average
    }

    #[cfg(test)]
    fn with_source(mut self, source: PathBuf) -> Self {
        self.source = source;
        self
    }

    fn read(&self) -> Option<f64> {
        let content = std::fs::read_to_string(&self.source).ok()?;
        content
            .split_whitespace()
            .nth(self.average.index())?
            .parse()
            .ok()
    }
}

impl Default for LoadAverageProcessor {
    fn default() -> Self {
        LoadAverageProcessor::new(LoadAverage::OneMinute)
    }
}

impl Processor for LoadAverageProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        if let Some(load) = self.read() {
            record.extra.insert("load_average".into(), load.into());
        }
        record
    }
}
