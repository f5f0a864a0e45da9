use std::sync::{Arc, Mutex};

use crate::handler::{
    impl_processable_wrapper, ActivationStrategy, ErrorLevelActivationStrategy, Handler,
};
use crate::processor::ProcessorStack;
use crate::{Level, LogError, LogRecord, LogResult};

#[derive(Debug)]
struct State {
    buffering: bool,
    buffer: Vec<LogRecord>,
}

/// Buffers every record until one activates the strategy, then releases the
/// buffer to the wrapped handler.
///
/// After activation, records go straight through unless `stop_buffering` is
/// false, in which case buffering starts over. On close, buffered records at
/// or above `passthru_level` are released anyway.
#[derive(Debug)]
pub struct FingersCrossedHandler {
    handler: Arc<dyn Handler>,
    activation_strategy: Arc<dyn ActivationStrategy>,
    buffer_size: usize,
    bubble: bool,
    stop_buffering: bool,
    passthru_level: Option<Level>,
    state: Mutex<State>,
    processors: ProcessorStack,
}

impl FingersCrossedHandler {
    /// Creates a handler activated by `activation_strategy`, or by warnings
    /// and above when none is given. `buffer_size = 0` is unlimited.
    pub fn new(
        handler: Arc<dyn Handler>,
        activation_strategy: Option<Arc<dyn ActivationStrategy>>,
        buffer_size: usize,
        bubble: bool,
        stop_buffering: bool,
        passthru_level: Option<Level>,
    ) -> Self {
        FingersCrossedHandler {
            handler,
            activation_strategy: activation_strategy
                .unwrap_or_else(|| Arc::new(ErrorLevelActivationStrategy::new(Level::Warning))),
            buffer_size,
            bubble,
            stop_buffering,
            passthru_level,
            state: Mutex::new(State {
                buffering: true,
                buffer: Vec::new(),
            }),
            processors: ProcessorStack::new(),
        }
    }

    /// The wrapped handler.
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// The activation strategy.
    pub fn activation_strategy(&self) -> &Arc<dyn ActivationStrategy> {
        &self.activation_strategy
    }

    /// Maximum number of buffered records, 0 when unlimited.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.bubble
    }

    /// Whether buffering stops for good after activation.
    pub fn stops_buffering(&self) -> bool {
        self.stop_buffering
    }

    /// Level released on close even without activation.
    pub fn passthru_level(&self) -> Option<Level> {
        self.passthru_level
    }

    /// Whether records are currently buffered.
    pub fn is_buffering(&self) -> bool {
        self.state.lock().map(|state| state.buffering).unwrap_or(false)
    }

    fn lock(&self) -> LogResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| LogError::LockPoisoned("FingersCrossedHandler"))
    }

    /// Releases the buffer to the wrapped handler.
    pub fn activate(&self) -> LogResult<()> {
        let records = {
            let mut state = self.lock()?;
            if self.stop_buffering {
                state.buffering = false;
            }
            std::mem::take(&mut state.buffer)
        };
        if records.is_empty() {
            return Ok(());
        }
        self.handler.handle_batch(records)
    }

    /// Releases passthru records, then starts buffering again.
    pub fn reset(&self) -> LogResult<()> {
        self.flush_passthru()?;
        self.lock()?.buffering = true;
        Ok(())
    }

    /// Drops the buffer and starts buffering again.
    pub fn clear(&self) -> LogResult<()> {
        let mut state = self.lock()?;
        state.buffer.clear();
        state.buffering = true;
        Ok(())
    }

    fn flush_passthru(&self) -> LogResult<()> {
        let records = std::mem::take(&mut self.lock()?.buffer);
        let Some(passthru_level) = self.passthru_level else {
            return Ok(());
        };
        let released: Vec<LogRecord> = records
            .into_iter()
            .filter(|record| record.level >= passthru_level)
            .collect();
        if released.is_empty() {
            return Ok(());
        }
        self.handler.handle_batch(released)
    }
}

impl Handler for FingersCrossedHandler {
    fn is_handling(&self, _record: &LogRecord) -> bool {
        true
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        let record = self.processors.apply(record);
        let mut state = self.lock()?;
        if !state.buffering {
            drop(state);
            self.handler.handle(record)?;
            return Ok(!self.bubble);
        }

        let activated = self.activation_strategy.is_handler_activated(&record);
        if self.buffer_size > 0 && state.buffer.len() >= self.buffer_size {
            state.buffer.remove(0);
        }
        state.buffer.push(record);
        drop(state);

        if activated {
            self.activate()?;
        }
        Ok(!self.bubble)
    }

    fn close(&self) -> LogResult<()> {
        self.flush_passthru()?;
        self.handler.close()
    }
}

impl_processable_wrapper!(FingersCrossedHandler);
