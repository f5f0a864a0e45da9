//! # Group handler factories
//!
//! `handlers` is a collection resolved with
//! [`resolve_handlers`](crate::resolve::resolve_handlers); disabled entries
//! are left out of the group.

use logwire::handler::{FallbackGroupHandler, GroupHandler, WhatFailureGroupHandler};

use crate::plugin_manager::HandlerFactory;
use crate::resolve::{apply_processors, resolve_handlers};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

macro_rules! group_factory {
    ($factory:ident, $handler:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug)]
        pub struct $factory {}

        impl $factory {
            #[doc = concat!("Creates a new ", stringify!($factory))]
            pub fn new() -> Self {
                $factory {}
            }
        }

        impl Default for $factory {
            fn default() -> Self {
                Self::new()
            }
        }

        impl HandlerFactory for $factory {
            type Handler = $handler;

            fn create_handler(
                &self,
                container: &ServiceContainer,
                _requested_name: &str,
                options: Option<&Value>,
            ) -> FactoryResult<$handler> {
                let reader = OptionsReader::required(options)?;
                let handlers = resolve_handlers(container, reader.required_value("handlers")?)?;
                let mut handler = $handler::new(handlers, reader.bool("bubble", true)?);
                apply_processors(&mut handler, container, &reader)?;
                Ok(handler)
            }
        }
    };
}

group_factory!(
    GroupHandlerFactory,
    GroupHandler,
    "Factory for [`GroupHandler`]s."
);
group_factory!(
    WhatFailureGroupHandlerFactory,
    WhatFailureGroupHandler,
    "Factory for [`WhatFailureGroupHandler`]s."
);
group_factory!(
    FallbackGroupHandlerFactory,
    FallbackGroupHandler,
    "Factory for [`FallbackGroupHandler`]s."
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use logwire::handler::TestHandler;
    use logwire::{Handler, Level, LogRecord};
    use rstest::rstest;
    use std::sync::Arc;

    #[test]
    fn disabled_entries_are_skipped() {
        let options = options! {
            "handlers" => vec![
                options! { "type" => "test" },
                options! { "type" => "stream", "enabled" => false },
                options! { "type" => "null", "options" => options! { "level" => "error" } },
            ],
            "bubble" => false,
        };
        let group = GroupHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "group", Some(&options))
            .unwrap();

        assert_eq!(group.handlers().len(), 2);
        assert!(format!("{:?}", group.handlers()[0]).starts_with("TestHandler"));
        assert!(format!("{:?}", group.handlers()[1]).starts_with("NullHandler"));
        assert!(!group.bubble());
    }

    #[test]
    fn handlers_may_be_instances() {
        let test = Arc::new(TestHandler::default());
        let handler: Arc<dyn Handler> = test.clone();
        let options = options! { "handlers" => vec![Value::instance(handler)] };
        let group = FallbackGroupHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "fallbackgroup", Some(&options))
            .unwrap();

        group.handle(LogRecord::new("app", Level::Info, "hello")).unwrap();
        assert!(test.has_record("hello", Level::Info));
    }

    #[rstest]
    #[case(options! {}, "No handlers provided")]
    #[case(options! { "handlers" => "stream" }, "Handlers must be an Array")]
    #[case(
        options! { "handlers" => vec![options! { "type" => "pigeon" }] },
        "Could not load handler \"pigeon\""
    )]
    fn invalid_handlers(#[case] options: Value, #[case] expected: &str) {
        let err = WhatFailureGroupHandlerFactory::new()
            .create_handler(&ServiceContainer::with_defaults(), "whatfailuregroup", Some(&options))
            .unwrap_err();
        assert_eq!(err.to_string(), expected);
    }
}
