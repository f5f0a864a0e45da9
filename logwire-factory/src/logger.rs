//! # Logger factory

use logwire::Logger;

use crate::resolve::{resolve_handlers, resolve_processors};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Builds [`Logger`]s from `name`, `handlers` and `processors` options.
///
/// The channel name defaults to the requested service name. Handlers are
/// asked in configured order, and processors run in configured order.
#[derive(Debug, Default)]
pub struct LoggerFactory {}

impl LoggerFactory {
    /// Creates a new LoggerFactory
    pub fn new() -> Self {
        LoggerFactory {}
    }

    /// Creates a logger.
    pub fn create_logger(
        &self,
        container: &ServiceContainer,
        requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<Logger> {
        let reader = OptionsReader::optional(options)?;
        let name = reader
            .string("name")?
            .unwrap_or_else(|| requested_name.to_owned());
        let mut logger = Logger::new(name);

        if let Some(handlers) = reader.get("handlers") {
            logger.set_handlers(resolve_handlers(container, handlers)?);
        }
        if let Some(processors) = reader.get("processors") {
            for processor in resolve_processors(container, processors)?.into_iter().rev() {
                logger.push_processor(processor);
            }
        }

        logwire::logwire_debug!(
            name: "LoggerFactory.Created",
            channel = logger.name(),
            handlers = logger.handlers().len(),
            processors = logger.processors().len()
        );
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use logwire::handler::TestHandler;
    use logwire::processor::TagProcessor;
    use logwire::{Handler, Level, Processor};
    use std::sync::Arc;

    #[test]
    fn name_defaults_to_the_requested_name() {
        let logger = LoggerFactory::new()
            .create_logger(&ServiceContainer::with_defaults(), "app", None)
            .unwrap();
        assert_eq!(logger.name(), "app");
        assert!(logger.handlers().is_empty());
    }

    #[test]
    fn handlers_and_processors_keep_configured_order() {
        let test = Arc::new(TestHandler::new(Level::Info, false));
        let handler: Arc<dyn Handler> = test.clone();
        let tags: Arc<dyn Processor> = Arc::new(TagProcessor::new(vec!["first".into()]));
        let options = options! {
            "name" => "payments",
            "handlers" => vec![
                Value::instance(handler.clone()),
                options! { "type" => "null" },
            ],
            "processors" => vec![
                Value::instance(tags.clone()),
                options! { "type" => "process_id" },
            ],
        };
        let logger = LoggerFactory::new()
            .create_logger(&ServiceContainer::with_defaults(), "app", Some(&options))
            .unwrap();

        assert_eq!(logger.name(), "payments");
        assert!(Arc::ptr_eq(&logger.handlers()[0], &handler));
        assert!(Arc::ptr_eq(&logger.processors()[0], &tags));
        assert!(format!("{:?}", logger.processors()[1]).starts_with("ProcessIdProcessor"));

        logger.warning("card declined").unwrap();
        let record = &test.records()[0];
        assert_eq!(record.channel, "payments");
        assert!(record.extra.contains_key("tags"));
        assert!(record.extra.contains_key("process_id"));
    }

    #[test]
    fn processors_must_be_a_collection() {
        let options = options! { "processors" => "uid" };
        let err = LoggerFactory::new()
            .create_logger(&ServiceContainer::with_defaults(), "app", Some(&options))
            .unwrap_err();
        assert_eq!(err.to_string(), "Processors must be an Array");
    }
}
