//! # Fingers crossed handler factory

use logwire::handler::FingersCrossedHandler;

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_activation_strategy, resolve_handler};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`FingersCrossedHandler`]s.
///
/// Without `activation_strategy`, the handler activates on warnings.
#[derive(Debug)]
pub struct FingersCrossedHandlerFactory {}

impl FingersCrossedHandlerFactory {
    /// Creates a new FingersCrossedHandlerFactory
    pub fn new() -> Self {
        FingersCrossedHandlerFactory {}
    }
}

impl Default for FingersCrossedHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for FingersCrossedHandlerFactory {
    type Handler = FingersCrossedHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<FingersCrossedHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        let activation_strategy = reader
            .get("activation_strategy")
            .map(|value| resolve_activation_strategy(container, value))
            .transpose()?;

        let mut handler = FingersCrossedHandler::new(
            wrapped,
            activation_strategy,
            reader.usize("buffer_size", 0)?,
            reader.bool("bubble", true)?,
            reader.bool("stop_buffering", true)?,
            reader.optional_level("passthru_level")?,
        );
        apply_processors(&mut handler, container, &reader)?;
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use logwire::handler::TestHandler;
    use logwire::{Handler, Level, LogRecord};
    use std::sync::Arc;

    #[test]
    fn releases_the_buffer_on_activation() {
        let test = Arc::new(TestHandler::default());
        let handler: Arc<dyn Handler> = test.clone();
        let options = options! {
            "handler" => Value::instance(handler),
            "activation_strategy" => "error",
            "buffer_size" => 10,
            "passthru_level" => "notice",
        };
        let fingers_crossed = FingersCrossedHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "fingers_crossed", Some(&options))
            .unwrap();

        assert_eq!(fingers_crossed.buffer_size(), 10);
        assert_eq!(fingers_crossed.passthru_level(), Some(Level::Notice));
        assert!(fingers_crossed.stops_buffering());

        fingers_crossed.handle(LogRecord::new("app", Level::Warning, "first")).unwrap();
        assert!(test.records().is_empty());
        fingers_crossed.handle(LogRecord::new("app", Level::Error, "second")).unwrap();
        assert_eq!(test.records().len(), 2);
        assert!(!fingers_crossed.is_buffering());
    }

    #[test]
    fn channel_level_strategy_from_a_map() {
        let options = options! {
            "handler" => options! { "type" => "test" },
            "activation_strategy" => options! {
                "type" => "channel_level",
                "options" => options! {
                    "default_action_level" => "error",
                    "channel_to_action_level" => options! { "audit" => "info" },
                },
            },
        };
        let handler = FingersCrossedHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "fingers_crossed", Some(&options))
            .unwrap();

        let strategy = handler.activation_strategy();
        assert!(strategy.is_handler_activated(&LogRecord::new("audit", Level::Info, "x")));
        assert!(!strategy.is_handler_activated(&LogRecord::new("app", Level::Warning, "x")));
    }
}
