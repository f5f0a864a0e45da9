//! # Overflow handler factory

use std::collections::HashMap;

use logwire::handler::OverflowHandler;
use logwire::Level;

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handler};
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`OverflowHandler`]s.
///
/// `thresholds` maps level names (or numbers) to record counts.
#[derive(Debug)]
pub struct OverflowHandlerFactory {}

impl OverflowHandlerFactory {
    /// Creates a new OverflowHandlerFactory
    pub fn new() -> Self {
        OverflowHandlerFactory {}
    }
}

impl Default for OverflowHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn thresholds(reader: &OptionsReader<'_>) -> FactoryResult<HashMap<Level, u32>> {
    let Some(value) = reader.get("thresholds") else {
        return Ok(HashMap::new());
    };
    let Some(map) = value.as_map() else {
        return Err(FactoryError::not_created("thresholds must be an Array"));
    };
    let entries = OptionsReader::required(Some(value))?;
    let mut thresholds = HashMap::with_capacity(map.len());
    for key in map.keys() {
        let level = key.parse::<Level>().map_err(|err| {
            FactoryError::not_created_with(format!("Invalid thresholds: {err}"), err)
        })?;
        thresholds.insert(level, entries.u32(key, 0)?);
    }
    Ok(thresholds)
}

impl HandlerFactory for OverflowHandlerFactory {
    type Handler = OverflowHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<OverflowHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        let mut handler = OverflowHandler::new(
            wrapped,
            thresholds(&reader)?,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        apply_processors(&mut handler, container, &reader)?;
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;

    #[test]
    fn thresholds_by_level_name() {
        let options = options! {
            "handler" => options! { "type" => "test" },
            "thresholds" => options! { "warning" => 10, "ERROR" => 2 },
        };
        let handler = OverflowHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "overflow", Some(&options))
            .unwrap();

        assert_eq!(handler.thresholds().len(), 2);
        assert_eq!(handler.thresholds()[&Level::Warning], 10);
        assert_eq!(handler.thresholds()[&Level::Error], 2);
    }

    #[test]
    fn unknown_threshold_level() {
        let options = options! {
            "handler" => options! { "type" => "test" },
            "thresholds" => options! { "loud" => 1 },
        };
        let err = OverflowHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "overflow", Some(&options))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid thresholds"));
    }
}
