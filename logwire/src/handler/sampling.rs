use std::sync::Arc;

use rand::Rng;

use crate::handler::{impl_processable_wrapper, Handler};
use crate::processor::ProcessorStack;
use crate::{LogError, LogRecord, LogResult};

/// Forwards roughly one record out of `factor` to the wrapped handler.
///
/// Sampled out records keep bubbling.
#[derive(Debug)]
pub struct SamplingHandler {
    handler: Arc<dyn Handler>,
    factor: u32,
    processors: ProcessorStack,
}

impl SamplingHandler {
    /// Creates a sampler; `factor` must be at least 1.
    pub fn new(handler: Arc<dyn Handler>, factor: u32) -> LogResult<Self> {
        if factor < 1 {
            return Err(LogError::InvalidArgument(format!(
                "sampling factor must be at least 1, got {factor}"
            )));
        }
        Ok(SamplingHandler {
            handler,
            factor,
            processors: ProcessorStack::new(),
        })
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// One record out of `factor` is kept.
    pub fn factor(&self) -> u32 {
        self.factor
    }
}

impl Handler for SamplingHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.handler.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if self.is_handling(&record) && rand::rng().random_range(1..=self.factor) == 1 {
            self.handler.handle(self.processors.apply(record))?;
        }
        Ok(false)
    }

    fn close(&self) -> LogResult<()> {
        self.handler.close()
    }
}

impl_processable_wrapper!(SamplingHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::TestHandler;
    use crate::Level;

    #[test]
    fn factor_one_keeps_everything() {
        let sink = Arc::new(TestHandler::default());
        let sampler = SamplingHandler::new(sink.clone(), 1).unwrap();
        for _ in 0..10 {
            assert!(!sampler.handle(LogRecord::new("app", Level::Info, "x")).unwrap());
        }
        assert_eq!(sink.records().len(), 10);
    }

    #[test]
    fn large_factor_drops_most_records() {
        let sink = Arc::new(TestHandler::default());
        let sampler = SamplingHandler::new(sink.clone(), 1_000_000).unwrap();
        for _ in 0..100 {
            sampler.handle(LogRecord::new("app", Level::Info, "x")).unwrap();
        }
        assert!(sink.records().len() < 10);
    }

    #[test]
    fn rejects_zero_factor() {
        let sink: Arc<dyn Handler> = Arc::new(TestHandler::default());
        assert!(SamplingHandler::new(sink, 0).is_err());
    }
}
