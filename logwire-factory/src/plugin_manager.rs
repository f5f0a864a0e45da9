//! # Plugin managers
//!
//! A [`PluginManager`] knows how to build one category of objects (handlers,
//! formatters, processors or activation strategies) from a plugin name and
//! options. Built objects are never cached: every call builds a new one.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use logwire::handler::ActivationStrategy;
use logwire::{Formatter, Handler, Processor};

use crate::{FactoryError, FactoryResult, ServiceContainer, Value};

/// The calling convention shared by every factory:
/// `(container, requested_name, options) -> object`.
pub type PluginFactory<T> =
    Arc<dyn Fn(&ServiceContainer, &str, Option<&Value>) -> FactoryResult<Arc<T>> + Send + Sync>;

/// Plugin manager building handlers.
pub type HandlerPluginManager = PluginManager<dyn Handler>;
/// Plugin manager building formatters.
pub type FormatterPluginManager = PluginManager<dyn Formatter>;
/// Plugin manager building processors.
pub type ProcessorPluginManager = PluginManager<dyn Processor>;
/// Plugin manager building activation strategies.
pub type ActivationStrategyPluginManager = PluginManager<dyn ActivationStrategy>;

/// Named factories for one category of objects.
///
/// Names are matched case-insensitively. Aliases point at another name.
pub struct PluginManager<T: ?Sized> {
    kind: &'static str,
    factories: HashMap<String, PluginFactory<T>>,
    aliases: HashMap<String, String>,
}

impl<T: ?Sized + 'static> PluginManager<T> {
    /// Creates an empty manager. `kind` names the category in errors.
    pub fn new(kind: &'static str) -> Self {
        PluginManager {
            kind,
            factories: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// The category this manager builds.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Registers `factory` under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ServiceContainer, &str, Option<&Value>) -> FactoryResult<Arc<T>>
            + Send
            + Sync
            + 'static,
    {
        self.factories
            .insert(normalize(&name.into()), Arc::new(factory));
    }

    /// Makes `alias` resolve to `target`.
    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases
            .insert(normalize(&alias.into()), normalize(&target.into()));
    }

    /// Whether `name` (or an alias of it) is registered.
    pub fn has(&self, name: &str) -> bool {
        self.factory(name).is_some()
    }

    /// Registered plugin names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    fn factory(&self, name: &str) -> Option<&PluginFactory<T>> {
        let key = normalize(name);
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.factories.get(key)
    }

    /// Builds `name` without options.
    pub fn get(&self, container: &ServiceContainer, name: &str) -> FactoryResult<Arc<T>> {
        self.build(container, name, None)
    }

    /// Builds `name` with `options`.
    pub fn build(
        &self,
        container: &ServiceContainer,
        name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Arc<T>> {
        let factory = self.factory(name).ok_or_else(|| {
            FactoryError::not_found(
                name,
                format!(
                    "A plugin by the name \"{name}\" was not found in the {} plugin manager",
                    self.kind
                ),
            )
        })?;
        let built = factory(container, name, options)?;
        logwire::logwire_debug!(name: "PluginManager.Built", kind = self.kind, plugin = name);
        Ok(built)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

impl<T: ?Sized> fmt::Debug for PluginManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        f.debug_struct("PluginManager")
            .field("kind", &self.kind)
            .field("plugins", &names)
            .finish()
    }
}

/// Builds handlers from options.
pub trait HandlerFactory: Send + Sync + 'static {
    /// The concrete handler built.
    type Handler: Handler + 'static;

    /// Creates a handler.
    fn create_handler(
        &self,
        container: &ServiceContainer,
        requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Self::Handler>;
}

/// Builds formatters from options.
pub trait FormatterFactory: Send + Sync + 'static {
    /// The concrete formatter built.
    type Formatter: Formatter + 'static;

    /// Creates a formatter.
    fn create_formatter(
        &self,
        container: &ServiceContainer,
        requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Self::Formatter>;
}

/// Builds processors from options.
pub trait ProcessorFactory: Send + Sync + 'static {
    /// The concrete processor built.
    type Processor: Processor + 'static;

    /// Creates a processor.
    fn create_processor(
        &self,
        container: &ServiceContainer,
        requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Self::Processor>;
}

/// Builds activation strategies from options.
pub trait ActivationStrategyFactory: Send + Sync + 'static {
    /// The concrete strategy built.
    type Strategy: ActivationStrategy + 'static;

    /// Creates an activation strategy.
    fn create_activation_strategy(
        &self,
        container: &ServiceContainer,
        requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Self::Strategy>;
}

impl PluginManager<dyn Handler> {
    /// Registers a typed handler factory under `name`.
    pub fn register_factory<F: HandlerFactory>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) {
        self.register(name, move |container, requested_name, options| {
            let handler = factory.create_handler(container, requested_name, options)?;
            Ok(Arc::new(handler) as Arc<dyn Handler>)
        });
    }
}

impl PluginManager<dyn Formatter> {
    /// Registers a typed formatter factory under `name`.
    pub fn register_factory<F: FormatterFactory>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) {
        self.register(name, move |container, requested_name, options| {
            let formatter = factory.create_formatter(container, requested_name, options)?;
            Ok(Arc::new(formatter) as Arc<dyn Formatter>)
        });
    }
}

impl PluginManager<dyn Processor> {
    /// Registers a typed processor factory under `name`.
    pub fn register_factory<F: ProcessorFactory>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) {
        self.register(name, move |container, requested_name, options| {
            let processor = factory.create_processor(container, requested_name, options)?;
            Ok(Arc::new(processor) as Arc<dyn Processor>)
        });
    }
}

impl PluginManager<dyn ActivationStrategy> {
    /// Registers a typed activation strategy factory under `name`.
    pub fn register_factory<F: ActivationStrategyFactory>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) {
        self.register(name, move |container, requested_name, options| {
            let strategy = factory.create_activation_strategy(container, requested_name, options)?;
            Ok(Arc::new(strategy) as Arc<dyn ActivationStrategy>)
        });
    }
}
