use std::collections::HashMap;
use std::fmt::Debug;

use crate::{Level, LogRecord};

/// Decides when a [`FingersCrossedHandler`](super::FingersCrossedHandler)
/// stops buffering and releases its records.
pub trait ActivationStrategy: Send + Sync + Debug {
    /// Whether the record activates the handler.
    fn is_handler_activated(&self, record: &LogRecord) -> bool;
}

/// Activates on any record at or above a level.
#[derive(Clone, Copy, Debug)]
pub struct ErrorLevelActivationStrategy {
    action_level: Level,
}

impl ErrorLevelActivationStrategy {
    /// Creates a strategy activating at `action_level`.
    pub fn new(action_level: Level) -> Self {
        ErrorLevelActivationStrategy { action_level }
    }

    /// The activation level.
    pub fn action_level(&self) -> Level {
        self.action_level
    }
}

impl ActivationStrategy for ErrorLevelActivationStrategy {
    fn is_handler_activated(&self, record: &LogRecord) -> bool {
        record.level >= self.action_level
    }
}

/// Activates at a per-channel level, falling back to a default level.
#[derive(Clone, Debug)]
pub struct ChannelLevelActivationStrategy {
    default_action_level: Level,
    channel_to_action_level: HashMap<String, Level>,
}

impl ChannelLevelActivationStrategy {
    /// Creates a strategy.
    pub fn new(
        default_action_level: Level,
        channel_to_action_level: HashMap<String, Level>,
    ) -> Self {
        ChannelLevelActivationStrategy {
            default_action_level,
            channel_to_action_level,
        }
    }

    /// The level used for channels without an explicit entry.
    pub fn default_action_level(&self) -> Level {
        self.default_action_level
    }

    /// Explicit per-channel levels.
    pub fn channel_to_action_level(&self) -> &HashMap<String, Level> {
        &self.channel_to_action_level
    }
}

impl ActivationStrategy for ChannelLevelActivationStrategy {
    fn is_handler_activated(&self, record: &LogRecord) -> bool {
        let level = self
            .channel_to_action_level
            .get(&record.channel)
            .copied()
            .unwrap_or(self.default_action_level);
        record.level >= level
    }
}
