//! # Processors
//!
//! A [`Processor`] receives a record before handlers see it and returns the
//! (possibly rewritten) record. Loggers and processable handlers keep their
//! processors in a [`ProcessorStack`]: the most recently pushed processor
//! runs first.

mod load_average;
mod process_id;
mod psr_log_message;
mod tag;
mod uid;

pub use load_average::{LoadAverage, LoadAverageProcessor};
pub use process_id::ProcessIdProcessor;
pub use psr_log_message::PsrLogMessageProcessor;
pub use tag::TagProcessor;
pub use uid::UidProcessor;

use std::fmt::Debug;
use std::sync::Arc;

use crate::LogRecord;

/// Transforms or enriches a log record.
pub trait Processor: Send + Sync + Debug {
    /// Returns the processed record.
    fn process(&self, record: LogRecord) -> LogRecord;
}

/// An ordered set of processors, applied most recently pushed first.
#[derive(Clone, Debug, Default)]
pub struct ProcessorStack {
    processors: Vec<Arc<dyn Processor>>,
}

impl ProcessorStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        ProcessorStack::default()
    }

    /// Adds a processor on top of the stack.
    pub fn push(&mut self, processor: Arc<dyn Processor>) {
        self.processors.insert(0, processor);
    }

    /// Removes the processor on top of the stack.
    pub fn pop(&mut self) -> Option<Arc<dyn Processor>> {
        if self.processors.is_empty() {
            None
        } else {
            Some(self.processors.remove(0))
        }
    }

    /// Processors in execution order.
    pub fn as_slice(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Runs every processor over the record.
    pub fn apply(&self, record: LogRecord) -> LogRecord {
        self.processors
            .iter()
            .fold(record, |record, processor| processor.process(record))
    }
}
