//! # Configuration module
//!
//! This module defines the YAML document the [`Configurator`](crate::Configurator)
//! reads: a map of named loggers, each with its handlers and processors in
//! the `{type, options, enabled}` form understood by the plugin managers.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{FactoryError, FactoryResult};

/// Configuration of every logger
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogwireConfig {
    /// Loggers by service name, in document order
    #[serde(default)]
    pub loggers: IndexMap<String, LoggerConfig>,
}

/// Configuration of one logger
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggerConfig {
    /// Channel name, defaults to the service name
    #[serde(default)]
    pub name: Option<String>,

    /// Handler entries, in dispatch order
    #[serde(default)]
    pub handlers: Option<serde_yaml::Value>,

    /// Processor entries, in execution order
    #[serde(default)]
    pub processors: Option<serde_yaml::Value>,
}

impl LogwireConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        LogwireConfig::default()
    }

    /// Creates a LogwireConfig from a YAML string
    pub fn from_yaml(yaml_str: &str) -> FactoryResult<Self> {
        let config: LogwireConfig = serde_yaml::from_str(yaml_str)?;
        Ok(config)
    }

    /// Creates a LogwireConfig from a YAML file
    pub fn from_yaml_file(file_path: impl AsRef<Path>) -> FactoryResult<Self> {
        let file_path = file_path.as_ref();
        let yaml_str = std::fs::read_to_string(file_path).map_err(|source| FactoryError::Io {
            path: file_path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml_str)
    }
}
