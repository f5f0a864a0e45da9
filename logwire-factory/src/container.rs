use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::plugin_manager::{
    ActivationStrategyPluginManager, FormatterPluginManager, HandlerPluginManager,
    ProcessorPluginManager,
};
use crate::{activation, formatter, handler, processor};
use crate::{FactoryError, FactoryResult, Instance};

/// Service name of the [`HandlerPluginManager`].
pub const HANDLER_MANAGER: &str = "logwire.handler_manager";
/// Service name of the [`FormatterPluginManager`].
pub const FORMATTER_MANAGER: &str = "logwire.formatter_manager";
/// Service name of the [`ProcessorPluginManager`].
pub const PROCESSOR_MANAGER: &str = "logwire.processor_manager";
/// Service name of the [`ActivationStrategyPluginManager`].
pub const ACTIVATION_STRATEGY_MANAGER: &str = "logwire.activation_strategy_manager";

type ServiceFactory = Arc<dyn Fn(&ServiceContainer) -> FactoryResult<Instance> + Send + Sync>;

#[derive(Clone)]
enum Service {
    Shared(Instance),
    Factory(ServiceFactory),
}

/// Named services factories look up: clients, publishers, formatters,
/// handlers and the plugin managers themselves.
#[derive(Clone, Default)]
pub struct ServiceContainer {
    services: HashMap<String, Service>,
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        ServiceContainer::default()
    }

    /// Creates a container holding the four plugin managers with every
    /// built-in factory registered.
    pub fn with_defaults() -> Self {
        let mut container = ServiceContainer::new();

        let mut handlers = HandlerPluginManager::new("handler");
        handler::register_defaults(&mut handlers);
        container.set_value(HANDLER_MANAGER, Arc::new(handlers));

        let mut formatters = FormatterPluginManager::new("formatter");
        formatter::register_defaults(&mut formatters);
        container.set_value(FORMATTER_MANAGER, Arc::new(formatters));

        let mut processors = ProcessorPluginManager::new("processor");
        processor::register_defaults(&mut processors);
        container.set_value(PROCESSOR_MANAGER, Arc::new(processors));

        let mut strategies = ActivationStrategyPluginManager::new("activation strategy");
        activation::register_defaults(&mut strategies);
        container.set_value(ACTIVATION_STRATEGY_MANAGER, Arc::new(strategies));

        container
    }

    /// Registers a shared instance under `name`.
    pub fn set(&mut self, name: impl Into<String>, instance: Instance) {
        self.services.insert(name.into(), Service::Shared(instance));
    }

    /// Registers `value` under `name`.
    pub fn set_value<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.set(name, Instance::new(value));
    }

    /// Registers a factory invoked on every lookup of `name`.
    pub fn set_factory<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&ServiceContainer) -> FactoryResult<Instance> + Send + Sync + 'static,
    {
        self.services
            .insert(name.into(), Service::Factory(Arc::new(factory)));
    }

    /// Whether `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Looks up `name`.
    pub fn get(&self, name: &str) -> FactoryResult<Instance> {
        match self.services.get(name) {
            Some(Service::Shared(instance)) => Ok(instance.clone()),
            Some(Service::Factory(factory)) => factory(self),
            None => Err(FactoryError::not_found(
                name,
                format!("Could not find service {name}"),
            )),
        }
    }

    /// Looks up `name` and checks it holds a `T`.
    pub fn get_as<T: Any + Clone>(&self, name: &str, expected: &'static str) -> FactoryResult<T> {
        let instance = self.get(name)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| FactoryError::InvalidService {
                name: name.to_owned(),
                expected,
                actual: instance.type_name(),
            })
    }

    /// The handler plugin manager.
    pub fn handler_manager(&self) -> FactoryResult<Arc<HandlerPluginManager>> {
        self.get_as(HANDLER_MANAGER, "HandlerPluginManager")
    }

    /// The formatter plugin manager.
    pub fn formatter_manager(&self) -> FactoryResult<Arc<FormatterPluginManager>> {
        self.get_as(FORMATTER_MANAGER, "FormatterPluginManager")
    }

    /// The processor plugin manager.
    pub fn processor_manager(&self) -> FactoryResult<Arc<ProcessorPluginManager>> {
        self.get_as(PROCESSOR_MANAGER, "ProcessorPluginManager")
    }

    /// The activation strategy plugin manager.
    pub fn activation_strategy_manager(
        &self,
    ) -> FactoryResult<Arc<ActivationStrategyPluginManager>> {
        self.get_as(ACTIVATION_STRATEGY_MANAGER, "ActivationStrategyPluginManager")
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.services.keys().collect();
        names.sort();
        f.debug_struct("ServiceContainer")
            .field("services", &names)
            .finish()
    }
}
