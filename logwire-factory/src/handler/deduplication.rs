//! # Deduplication handler factory

use std::path::PathBuf;

use logwire::handler::DeduplicationHandler;
use logwire::Level;

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handler};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`DeduplicationHandler`]s.
#[derive(Debug)]
pub struct DeduplicationHandlerFactory {}

impl DeduplicationHandlerFactory {
    /// Creates a new DeduplicationHandlerFactory
    pub fn new() -> Self {
        DeduplicationHandlerFactory {}
    }
}

impl Default for DeduplicationHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for DeduplicationHandlerFactory {
    type Handler = DeduplicationHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<DeduplicationHandler> {
        let reader = OptionsReader::required(options)?;
        let wrapped = resolve_handler(container, reader.required_value("handler")?, "handler")?;
        let mut handler = DeduplicationHandler::new(
            wrapped,
            reader.string("deduplication_store")?.map(PathBuf::from),
            reader.level("deduplication_level", Level::Error)?,
            reader.u64("time", DeduplicationHandler::DEFAULT_TIME)?,
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
    fn defaults() {
        let options = options! { "handler" => options! { "type" => "test" } };
        let handler = DeduplicationHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "deduplication", Some(&options))
            .unwrap();

        assert_eq!(handler.deduplication_level(), Level::Error);
        assert_eq!(handler.time(), DeduplicationHandler::DEFAULT_TIME);
        assert!(handler.store().ends_with("logwire-dedup.log"));
    }

    #[test]
    fn custom_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("dedup.log");
        let options = options! {
            "handler" => options! { "type" => "test" },
            "deduplication_store" => store.display().to_string(),
            "deduplication_level" => "critical",
            "time" => 5,
            "bubble" => false,
        };
        let handler = DeduplicationHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "deduplication", Some(&options))
            .unwrap();

        assert_eq!(handler.store(), store.as_path());
        assert_eq!(handler.deduplication_level(), Level::Critical);
        assert_eq!(handler.time(), 5);
        assert!(!handler.bubble());
    }
}
