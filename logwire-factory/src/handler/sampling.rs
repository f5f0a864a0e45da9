//! # Sampling handler factory

use logwire::handler::SamplingHandler;

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handler};
use crate::{FactoryError, FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`SamplingHandler`]s.
#[derive(Debug)]
pub struct SamplingHandlerFactory {}

impl SamplingHandlerFactory {
    /// Creates a new SamplingHandlerFactory
    pub fn new() -> Self {
        SamplingHandlerFactory {}
    }
}

impl Default for SamplingHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for SamplingHandlerFactory {
    type Handler = SamplingHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<SamplingHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        if !reader.contains("factor") {
            return Err(FactoryError::not_created("No factor provided"));
        }
        let mut handler = SamplingHandler::new(wrapped, reader.u32("factor", 1)?)?;
        apply_processors(&mut handler, container, &reader)?;
        Ok(handler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use rstest::rstest;

    #[test]
    fn factor_is_kept() {
        let options = options! { "handler" => options! { "type" => "test" }, "factor" => 5 };
        let handler = SamplingHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "sampling", Some(&options))
            .unwrap();
        assert_eq!(handler.factor(), 5);
    }

    #[rstest]
    #[case(options! { "handler" => options! { "type" => "test" } }, "No factor provided")]
    #[case(
        options! { "handler" => options! { "type" => "test" }, "factor" => 0 },
        "sampling factor must be at least 1"
    )]
    #[case(
        options! { "handler" => options! { "type" => "test" }, "factor" => "often" },
        "factor must be an Integer"
    )]
    fn invalid_factor(#[case] options: Value, #[case] expected: &str) {
        let err = SamplingHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "sampling", Some(&options))
            .unwrap_err();
        assert!(err.to_string().contains(expected), "{err}");
    }
}
