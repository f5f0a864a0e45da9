//! # Configurator
//!
//! Builds every logger of a [`LogwireConfig`] with the plugin managers of a
//! [`ServiceContainer`].

use std::path::Path;

use indexmap::IndexMap;
use logwire::{LogResult, Logger};

use crate::config::{LoggerConfig, LogwireConfig};
use crate::logger::LoggerFactory;
use crate::{FactoryResult, Options, ServiceContainer, Value};

/// Builds [`Loggers`] from YAML or from an already parsed [`LogwireConfig`].
///
/// Services referenced by name in the configuration (Redis clients,
/// publishers, mailers, providers) must be registered in the container
/// first, see [`Configurator::container_mut`].
#[derive(Debug)]
pub struct Configurator {
    container: ServiceContainer,
    logger_factory: LoggerFactory,
}

impl Configurator {
    /// Creates a configurator with every built-in factory registered.
    pub fn new() -> Self {
        Configurator::with_container(ServiceContainer::with_defaults())
    }

    /// Creates a configurator resolving services and plugins from `container`.
    pub fn with_container(container: ServiceContainer) -> Self {
        Configurator {
            container,
            logger_factory: LoggerFactory::new(),
        }
    }

    /// The container.
    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    /// The container, to register services before configuring.
    pub fn container_mut(&mut self) -> &mut ServiceContainer {
        &mut self.container
    }

    /// Builds the loggers described by a YAML string.
    pub fn configure_from_yaml(&self, yaml_str: &str) -> FactoryResult<Loggers> {
        let config = LogwireConfig::from_yaml(yaml_str)?;
        self.configure(config)
    }

    /// Builds the loggers described by a YAML file.
    pub fn configure_from_yaml_file(&self, file_path: impl AsRef<Path>) -> FactoryResult<Loggers> {
        let config = LogwireConfig::from_yaml_file(file_path)?;
        self.configure(config)
    }

    /// Builds the loggers of `config`, failing on the first invalid one.
    pub fn configure(&self, config: LogwireConfig) -> FactoryResult<Loggers> {
        let mut loggers = IndexMap::with_capacity(config.loggers.len());
        for (service_name, logger_config) in config.loggers {
            let options = Self::as_options(logger_config);
            let logger =
                self.logger_factory
                    .create_logger(&self.container, &service_name, Some(&options))?;
            loggers.insert(service_name, logger);
        }
        logwire::logwire_info!(name: "Configurator.Configured", loggers = loggers.len());
        Ok(Loggers { loggers })
    }

    fn as_options(config: LoggerConfig) -> Value {
        let mut options = Options::new();
        if let Some(name) = config.name {
            options.insert("name".to_owned(), Value::from(name));
        }
        if let Some(handlers) = config.handlers {
            options.insert("handlers".to_owned(), Value::from(handlers));
        }
        if let Some(processors) = config.processors {
            options.insert("processors".to_owned(), Value::from(processors));
        }
        Value::Map(options)
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the configured loggers by service name
#[derive(Debug, Default)]
pub struct Loggers {
    loggers: IndexMap<String, Logger>,
}

impl Loggers {
    /// The logger configured under `service_name`.
    pub fn get(&self, service_name: &str) -> Option<&Logger> {
        self.loggers.get(service_name)
    }

    /// Service names, in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loggers.keys().map(String::as_str)
    }

    /// Service names and loggers, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Logger)> {
        self.loggers
            .iter()
            .map(|(name, logger)| (name.as_str(), logger))
    }

    /// Number of loggers.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Whether no logger was configured.
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Closes every logger, returning the first error after trying all.
    pub fn close(&self) -> LogResult<()> {
        let mut result = Ok(());
        for logger in self.loggers.values() {
            if let Err(err) = logger.close() {
                logwire::logwire_warn!(
                    name: "Loggers.CloseFailed",
                    channel = logger.name(),
                    error = format!("{err}")
                );
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }
}
