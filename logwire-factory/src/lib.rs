//! # logwire factories
//!
//! Builds [`logwire`] loggers, handlers, formatters, processors and
//! activation strategies from configuration.
//!
//! Every factory follows the same calling convention,
//! `(container, requested_name, options) -> object`. Options arrive as a
//! [`Value`] tree. Nested dependencies are resolved through the
//! [`ServiceContainer`]: a sub-handler or formatter may be given as a
//! `{type, options, enabled}` map built by a [`PluginManager`], as the name of
//! a container service, or as a pre-built [`Instance`].
//!
//! ## Example
//!
//! ```rust
//! use logwire_factory::Configurator;
//!
//! let loggers = Configurator::new()
//!     .configure_from_yaml(
//!         r#"
//!         loggers:
//!           app:
//!             handlers:
//!               - type: test
//!                 options:
//!                   level: info
//!             processors:
//!               - type: uid
//!                 options:
//!                   length: 8
//!         "#,
//!     )
//!     .unwrap();
//!
//! let app = loggers.get("app").unwrap();
//! app.info("service started").unwrap();
//! assert_eq!(app.handlers().len(), 1);
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

pub mod activation;
pub mod config;
mod configurator;
mod container;
mod error;
pub mod formatter;
pub mod handler;
mod logger;
mod options;
pub mod plugin_manager;
pub mod processor;
pub mod resolve;
mod value;

pub use configurator::{Configurator, Loggers};
pub use container::{
    ServiceContainer, ACTIVATION_STRATEGY_MANAGER, FORMATTER_MANAGER, HANDLER_MANAGER,
    PROCESSOR_MANAGER,
};
pub use error::{FactoryError, FactoryResult};
pub use logger::LoggerFactory;
pub use options::OptionsReader;
pub use plugin_manager::{
    ActivationStrategyFactory, ActivationStrategyPluginManager, FormatterFactory,
    FormatterPluginManager, HandlerFactory, HandlerPluginManager, PluginFactory, PluginManager,
    ProcessorFactory, ProcessorPluginManager,
};
pub use value::{Instance, Options, Value};
