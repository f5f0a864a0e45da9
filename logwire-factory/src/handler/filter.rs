//! # Filter handler factory

use logwire::handler::FilterHandler;
use logwire::Level;

use crate::options::parse_level;
use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handler};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`FilterHandler`]s.
///
/// `min_level_or_list` is either the lowest accepted level, used with
/// `max_level`, or the exact list of accepted levels.
#[derive(Debug)]
pub struct FilterHandlerFactory {}

impl FilterHandlerFactory {
    /// Creates a new FilterHandlerFactory
    pub fn new() -> Self {
        FilterHandlerFactory {}
    }
}

impl Default for FilterHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for FilterHandlerFactory {
    type Handler = FilterHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<FilterHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        let bubble = reader.bool("bubble", true)?;

        let mut handler = match reader.get("min_level_or_list") {
            Some(Value::List(levels)) => {
                let levels = levels
                    .iter()
                    .map(|level| parse_level("min_level_or_list", level))
                    .collect::<FactoryResult<Vec<Level>>>()?;
                FilterHandler::with_levels(wrapped, levels, bubble)
            }
            _ => FilterHandler::with_range(
                wrapped,
                reader.level("min_level_or_list", Level::Debug)?,
                reader.level("max_level", Level::Emergency)?,
                bubble,
            ),
        };
        apply_processors(&mut handler, container, &reader)?;
        Ok(handler)
    }
}
