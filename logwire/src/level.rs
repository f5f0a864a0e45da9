use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a [`LogRecord`](crate::LogRecord).
///
/// The numeric values follow the RFC 5424 inspired scale used by most
/// channel based loggers, so levels configured as numbers keep working.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Detailed debug information.
    Debug = 100,
    /// Interesting events.
    Info = 200,
    /// Normal but significant events.
    Notice = 250,
    /// Exceptional occurrences that are not errors.
    Warning = 300,
    /// Runtime errors that do not require immediate action.
    Error = 400,
    /// Critical conditions.
    Critical = 500,
    /// Action must be taken immediately.
    Alert = 550,
    /// System is unusable.
    Emergency = 600,
}

impl Level {
    /// Every level, lowest first.
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Numeric value of the level.
    pub fn value(self) -> u16 {
        self as u16
    }

    /// Upper case name of the level, e.g. `WARNING`.
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        }
    }

    /// Looks a level up by its numeric value.
    pub fn from_value(value: i64) -> Option<Level> {
        Level::ALL
            .into_iter()
            .find(|level| i64::from(level.value()) == value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("level \"{0}\" is not defined, use one of: debug, info, notice, warning, error, critical, alert, emergency")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses a level name in any case, or its numeric value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Level::from_value(value).ok_or_else(|| ParseLevelError(s.to_owned()));
        }
        Level::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseLevelError(s.to_owned()))
    }
}
