//! # Activation strategy factories
//!
//! Strategies decide when a `fingers_crossed` handler releases its buffer.

use std::collections::HashMap;

use logwire::handler::{ChannelLevelActivationStrategy, ErrorLevelActivationStrategy};
use logwire::Level;

use crate::options::parse_level;
use crate::plugin_manager::{ActivationStrategyFactory, ActivationStrategyPluginManager};
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`ErrorLevelActivationStrategy`]s. `action_level` defaults to
/// `warning`.
#[derive(Debug, Default)]
pub struct ErrorLevelActivationStrategyFactory {}

impl ActivationStrategyFactory for ErrorLevelActivationStrategyFactory {
    type Strategy = ErrorLevelActivationStrategy;

    fn create_activation_strategy(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<ErrorLevelActivationStrategy> {
        let reader = OptionsReader::optional(options)?;
        Ok(ErrorLevelActivationStrategy::new(
            reader.level("action_level", Level::Warning)?,
        ))
    }
}

/// Factory for [`ChannelLevelActivationStrategy`]s.
#[derive(Debug, Default)]
pub struct ChannelLevelActivationStrategyFactory {}

impl ActivationStrategyFactory for ChannelLevelActivationStrategyFactory {
    type Strategy = ChannelLevelActivationStrategy;

    fn create_activation_strategy(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<ChannelLevelActivationStrategy> {
        let reader = OptionsReader::optional(options)?;
        let mut channels = HashMap::new();
        if let Some(value) = reader.get("channel_to_action_level") {
            let map = value.as_map().ok_or_else(|| {
                FactoryError::not_created("channel_to_action_level must be an Array")
            })?;
            for (channel, level) in map {
                channels.insert(channel.clone(), parse_level("channel_to_action_level", level)?);
            }
        }
        Ok(ChannelLevelActivationStrategy::new(
            reader.level("default_action_level", Level::Error)?,
            channels,
        ))
    }
}

pub(crate) fn register_defaults(manager: &mut ActivationStrategyPluginManager) {
    manager.register_factory("error_level", ErrorLevelActivationStrategyFactory::default());
    manager.register_factory("channel_level", ChannelLevelActivationStrategyFactory::default());
    manager.alias("ErrorLevelActivationStrategy", "error_level");
    manager.alias("ChannelLevelActivationStrategy", "channel_level");
}
