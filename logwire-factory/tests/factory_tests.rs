use std::sync::{Arc, Mutex};

use logwire::formatter::JsonFormatter;
use logwire::handler::{RedisClient, RedisHandler, TestHandler};
use logwire::{Formatter, Handler, Level, LogRecord, LogResult};
use logwire_factory::handler::basic::TestHandlerFactory;
use logwire_factory::handler::redis::RedisHandlerFactory;
use logwire_factory::HandlerFactory;
use logwire_factory::{options, FactoryError, ServiceContainer, Value};
use rstest::rstest;

#[derive(Debug, Default)]
struct MockRedis {
    calls: Mutex<usize>,
}

impl RedisClient for MockRedis {
    fn rpush(&self, _key: &str, _value: &str) -> LogResult<()> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }

    fn ltrim(&self, _key: &str, _start: i64, _stop: i64) -> LogResult<()> {
        Ok(())
    }

    fn publish(&self, _channel: &str, _message: &str) -> LogResult<()> {
        *self.calls.lock().unwrap() += 1;
        Ok(())
    }
}

#[rstest]
#[case("stream")]
#[case("rotating_file")]
#[case("socket")]
#[case("redis")]
#[case("redis_pub_sub")]
#[case("amqp")]
#[case("mailer")]
#[case("group")]
#[case("whatfailuregroup")]
#[case("fallbackgroup")]
#[case("buffer")]
#[case("filter")]
#[case("fingers_crossed")]
#[case("sampling")]
#[case("deduplication")]
#[case("overflow")]
fn handlers_with_required_options_need_a_map(#[case] name: &str) {
    let container = ServiceContainer::with_defaults();
    let manager = container.handler_manager().unwrap();

    let missing = manager.get(&container, name).unwrap_err();
    assert_eq!(missing.to_string(), "Options must be an Array");

    let scalar = manager.build(&container, name, Some(&Value::from("x"))).unwrap_err();
    assert!(matches!(scalar, FactoryError::NotCreated { .. }));
    assert_eq!(scalar.to_string(), "Options must be an Array");
}

#[rstest]
#[case("null")]
#[case("test")]
fn handlers_without_required_options_reject_non_maps(#[case] name: &str) {
    let container = ServiceContainer::with_defaults();
    let manager = container.handler_manager().unwrap();

    assert!(manager.get(&container, name).is_ok());
    let err = manager
        .build(&container, name, Some(&Value::List(vec![])))
        .unwrap_err();
    assert_eq!(err.to_string(), "Options must be an Array");
}

#[test]
fn redis_client_resolved_from_the_container() {
    let client: Arc<dyn RedisClient> = Arc::new(MockRedis::default());
    let mut container = ServiceContainer::with_defaults();
    container.set_value("xyz", client.clone());

    let options = options! { "client" => "xyz", "key" => "logs" };
    let handler: RedisHandler = RedisHandlerFactory::new()
        .create_handler(&container, "redis", Some(&options))
        .unwrap();

    assert!(Arc::ptr_eq(handler.client(), &client));
    assert_eq!(handler.level(), Level::Debug);
    assert!(handler.bubble());
}

#[test]
fn processors_run_in_configured_order() {
    let options = options! {
        "processors" => vec![
            options! { "type" => "tag", "options" => options! { "tags" => "first" } },
            options! {
                "type" => "tag",
                "enabled" => false,
                "options" => options! { "tags" => "skipped" },
            },
            options! { "type" => "tag", "options" => options! { "tags" => "last" } },
        ],
    };
    let handler = TestHandlerFactory::new()
        .create_handler(&ServiceContainer::with_defaults(), "test", Some(&options))
        .unwrap();

    use logwire::ProcessableHandler;
    assert_eq!(handler.processors().len(), 2);

    // Each tag processor overwrites `extra.tags`, so the last one configured wins.
    handler.handle(LogRecord::new("app", Level::Info, "x")).unwrap();
    let record = &handler.records()[0];
    assert_eq!(record.extra["tags"][0].as_str(), Some("last"));
}

#[rstest]
#[case(Value::from(true))]
#[case(Value::from(false))]
#[case(Value::from(1))]
fn formatter_scalars_are_rejected(#[case] formatter: Value) {
    let options = options! { "formatter" => formatter };
    let err = TestHandlerFactory::new()
        .create_handler(&ServiceContainer::with_defaults(), "test", Some(&options))
        .unwrap_err();
    assert!(err.to_string().starts_with("formatter must be an Array"));
}

#[test]
fn formatter_instance_is_used_as_is() {
    let formatter: Arc<dyn Formatter> = Arc::new(JsonFormatter::default());
    let options = options! { "formatter" => Value::instance(formatter.clone()) };
    let handler = TestHandlerFactory::new()
        .create_handler(&ServiceContainer::with_defaults(), "test", Some(&options))
        .unwrap();

    use logwire::FormattableHandler;
    assert!(Arc::ptr_eq(&handler.formatter(), &formatter));
}

#[test]
fn formatter_service_name() {
    let formatter: Arc<dyn Formatter> = Arc::new(JsonFormatter::default());
    let mut container = ServiceContainer::with_defaults();
    container.set_value("json_formatter", formatter.clone());

    let options = options! { "formatter" => "json_formatter" };
    let handler = TestHandlerFactory::new()
        .create_handler(&container, "test", Some(&options))
        .unwrap();

    use logwire::FormattableHandler;
    assert!(Arc::ptr_eq(&handler.formatter(), &formatter));
}

#[test]
fn negative_socket_timeout_keeps_the_handler_error() {
    let container = ServiceContainer::with_defaults();
    let manager = container.handler_manager().unwrap();
    let options = options! { "connection_string" => "localhost:514", "writing_timeout" => -5 };

    let err = manager.build(&container, "socket", Some(&options)).unwrap_err();
    match err {
        FactoryError::NotCreated { source: Some(source), .. } => {
            assert!(source.to_string().contains("writing timeout"));
        }
        other => panic!("expected NotCreated with a source, got {other:?}"),
    }
}

#[test]
fn disabled_handlers_in_groups() {
    let sink = Arc::new(TestHandler::default());
    let sink_handler: Arc<dyn Handler> = sink.clone();
    let options = options! {
        "handlers" => vec![
            options! { "type" => "test", "enabled" => false },
            Value::instance(sink_handler),
        ],
    };
    let container = ServiceContainer::with_defaults();
    let group = container
        .handler_manager()
        .unwrap()
        .build(&container, "group", Some(&options))
        .unwrap();

    group.handle(LogRecord::new("app", Level::Info, "only once")).unwrap();
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn disabled_required_handler() {
    let options = options! {
        "handler" => options! { "type" => "test", "enabled" => false },
    };
    let container = ServiceContainer::with_defaults();
    let err = container
        .handler_manager()
        .unwrap()
        .build(&container, "fingers_crossed", Some(&options))
        .unwrap_err();
    assert_eq!(err.to_string(), "No active handler specified");
}

#[test]
fn missing_plugin_manager() {
    let container = ServiceContainer::new();
    let options = options! { "handlers" => vec![options! { "type" => "test" }] };
    let err = logwire_factory::LoggerFactory::new()
        .create_logger(&container, "app", Some(&options))
        .unwrap_err();
    assert!(matches!(err, FactoryError::NotFound { .. }));
    assert_eq!(err.to_string(), "Could not find service logwire.handler_manager");
}
