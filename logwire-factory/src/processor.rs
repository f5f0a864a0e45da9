//! # Processor factories
//!
//! Registered in the processor plugin manager as `psr_log_message`, `uid`,
//! `tag`, `process_id` and `load_average`.

use logwire::processor::{
    LoadAverage, LoadAverageProcessor, ProcessIdProcessor, PsrLogMessageProcessor, TagProcessor,
    UidProcessor,
};

use crate::plugin_manager::{ProcessorFactory, ProcessorPluginManager};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`PsrLogMessageProcessor`]s.
#[derive(Debug, Default)]
pub struct PsrLogMessageProcessorFactory {}

impl ProcessorFactory for PsrLogMessageProcessorFactory {
    type Processor = PsrLogMessageProcessor;

    fn create_processor(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<PsrLogMessageProcessor> {
        let reader = OptionsReader::optional(options)?;
        Ok(PsrLogMessageProcessor::new(
            reader.string("date_format")?,
            reader.bool("remove_used_context_fields", false)?,
        ))
    }
}

/// Factory for [`UidProcessor`]s. `length` must be between 1 and 32.
#[derive(Debug, Default)]
pub struct UidProcessorFactory {}

impl ProcessorFactory for UidProcessorFactory {
    type Processor = UidProcessor;

    fn create_processor(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<UidProcessor> {
        let reader = OptionsReader::optional(options)?;
        Ok(UidProcessor::new(
            reader.usize("length", UidProcessor::DEFAULT_LENGTH)?,
        )?)
    }
}

/// Factory for [`TagProcessor`]s.
#[derive(Debug, Default)]
pub struct TagProcessorFactory {}

impl ProcessorFactory for TagProcessorFactory {
    type Processor = TagProcessor;

    fn create_processor(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<TagProcessor> {
        let reader = OptionsReader::optional(options)?;
        Ok(TagProcessor::new(reader.strings("tags")?))
    }
}

/// Factory for [`ProcessIdProcessor`]s.
#[derive(Debug, Default)]
pub struct ProcessIdProcessorFactory {}

impl ProcessorFactory for ProcessIdProcessorFactory {
    type Processor = ProcessIdProcessor;

    fn create_processor(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<ProcessIdProcessor> {
        OptionsReader::optional(options)?;
        Ok(ProcessIdProcessor)
    }
}

/// Factory for [`LoadAverageProcessor`]s. `avg_system_load` is 1, 5 or 15
/// minutes.
#[derive(Debug, Default)]
pub struct LoadAverageProcessorFactory {}

impl ProcessorFactory for LoadAverageProcessorFactory {
    type Processor = LoadAverageProcessor;

    fn create_processor(
        &self,
        _container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<LoadAverageProcessor> {
        let reader = OptionsReader::optional(options)?;
        let average = LoadAverage::from_minutes(reader.u64("avg_system_load", 1)?)?;
        Ok(LoadAverageProcessor::new(average))
    }
}

pub(crate) fn register_defaults(manager: &mut ProcessorPluginManager) {
    manager.register_factory("psr_log_message", PsrLogMessageProcessorFactory::default());
    manager.register_factory("uid", UidProcessorFactory::default());
    manager.register_factory("tag", TagProcessorFactory::default());
    manager.register_factory("process_id", ProcessIdProcessorFactory::default());
    manager.register_factory("load_average", LoadAverageProcessorFactory::default());
    manager.alias("PsrLogMessageProcessor", "psr_log_message");
    manager.alias("UidProcessor", "uid");
    manager.alias("TagProcessor", "tag");
    manager.alias("ProcessIdProcessor", "process_id");
    manager.alias("LoadAverageProcessor", "load_average");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{options, FactoryError};
    use logwire::{Level, LogRecord, Processor};
    use rstest::rstest;

    #[rstest]
    #[case("psr_log_message")]
    #[case("uid")]
    #[case("tag")]
    #[case("process_id")]
    #[case("load_average")]
    #[case("UidProcessor")]
    fn defaults_build_every_processor(#[case] name: &str) {
        let container = ServiceContainer::with_defaults();
        let manager = container.processor_manager().unwrap();
        let processor = manager.get(&container, name).unwrap();
        let record = processor.process(LogRecord::new("app", Level::Info, "built"));
        assert_eq!(record.message, "built");
    }

    #[test]
    fn uid_length() {
        let processor = UidProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "uid", Some(&options! { "length" => 12 }))
            .unwrap();
        assert_eq!(processor.uid().len(), 12);

        let default = UidProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "uid", None)
            .unwrap();
        assert_eq!(default.uid().len(), UidProcessor::DEFAULT_LENGTH);
    }

    #[rstest]
    #[case(0)]
    #[case(33)]
    fn uid_length_out_of_range(#[case] length: i64) {
        let err = UidProcessorFactory::default()
            .create_processor(
                &ServiceContainer::new(),
                "uid",
                Some(&options! { "length" => length }),
            )
            .unwrap_err();
        assert!(matches!(err, FactoryError::NotCreated { source: Some(_), .. }));
    }

    #[test]
    fn tags_from_a_single_string() {
        let processor = TagProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "tag", Some(&options! { "tags" => "web" }))
            .unwrap();
        assert_eq!(processor.tags(), ["web".to_owned()]);
    }

    #[test]
    fn psr_log_message_options() {
        let options = options! { "remove_used_context_fields" => true, "date_format" => "%Y" };
        let processor = PsrLogMessageProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "psr_log_message", Some(&options))
            .unwrap();
        assert!(processor.removes_used_context_fields());
        assert_eq!(processor.date_format(), Some("%Y"));
    }

    #[rstest]
    #[case(1, LoadAverage::OneMinute)]
    #[case(5, LoadAverage::FiveMinutes)]
    #[case(15, LoadAverage::FifteenMinutes)]
    fn load_average_minutes(#[case] minutes: i64, #[case] expected: LoadAverage) {
        let options = options! { "avg_system_load" => minutes };
        let processor = LoadAverageProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "load_average", Some(&options))
            .unwrap();
        assert_eq!(processor.average(), expected);
    }

    #[test]
    fn process_id_rejects_non_map_options() {
        let err = ProcessIdProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "process_id", Some(&Value::from("x")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Options must be an Array");

        let processor = ProcessIdProcessorFactory::default()
            .create_processor(&ServiceContainer::new(), "process_id", None)
            .unwrap();
        let record = processor.process(LogRecord::new("app", Level::Info, "x"));
        assert!(record.extra.contains_key("process_id"));
    }
}
