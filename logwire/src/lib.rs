//! # logwire
//!
//! Channel based logging built from three kinds of pluggable parts:
//!
//! - [`Handler`]s receive [`LogRecord`]s and write them somewhere (a stream, a
//!   file, a socket, a Redis list, an OpenTelemetry logger provider) or wrap
//!   other handlers to buffer, filter, sample or group them.
//! - [`Formatter`]s turn a record into its output representation.
//! - [`Processor`]s enrich or rewrite a record before it is handled.
//!
//! A [`Logger`] owns an ordered list of handlers and processors for one
//! channel. Records are processed once, then offered to the handlers in order
//! until one of them stops the record from bubbling further.
//!
//! ## Diagram
//!
//! ```ascii
//!   +-------------------+   +--------------+   +----------------------+
//!   |                   |   |              |   |                      |
//!   | Logger.log()      +---> Processor(s) +---> Handler -> Formatter |
//!   |                   |   |              |   | Handler -> Formatter |
//!   +-------------------+   +--------------+   +----------------------+
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use logwire::handler::TestHandler;
//! use logwire::{Level, Logger};
//!
//! let handler = Arc::new(TestHandler::new(Level::Info, true));
//! let mut logger = Logger::new("app");
//! logger.push_handler(handler.clone());
//!
//! logger.info("service started").unwrap();
//! logger.debug("not recorded").unwrap();
//!
//! assert!(handler.has_record("service started", Level::Info));
//! assert_eq!(handler.records().len(), 1);
//! ```
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod error;
pub mod formatter;
pub mod handler;
mod internal_logging;
mod level;
mod logger;
pub mod processor;
mod record;

pub use error::{LogError, LogResult};
pub use formatter::Formatter;
pub use handler::{FormattableHandler, Handler, ProcessableHandler};
pub use level::{Level, ParseLevelError};
pub use logger::Logger;
pub use processor::Processor;
pub use record::{Context, LogRecord};

#[doc(hidden)]
#[cfg(feature = "internal-logs")]
pub mod _private {
    pub use tracing::{debug, error, info, warn};
}
