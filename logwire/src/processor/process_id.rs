use crate::processor::Processor;
use crate::LogRecord;

/// Adds the current process id to `extra.process_id`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessIdProcessor;

impl Processor for ProcessIdProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        record
            .extra
            .insert("process_id".into(), std::process::id().into());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;

    #[test]
    fn adds_process_id() {
        let record = ProcessIdProcessor.process(LogRecord::new("app", Level::Info, "x"));
        assert_eq!(
            record.extra["process_id"].as_u64(),
            Some(u64::from(std::process::id()))
        );
    }
}
