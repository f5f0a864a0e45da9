use std::sync::Arc;

use logwire::handler::TestHandler;
use logwire::Handler;
use logwire_factory::Configurator;

/// Example of building loggers from a declarative YAML configuration.
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(TestHandler::default());
    let sink_handler: Arc<dyn Handler> = sink.clone();

    let mut configurator = Configurator::new();
    configurator.container_mut().set_value("app.sink", sink_handler);

    let config_yaml = r#"
        loggers:
            app:
                handlers:
                    - type: fingers_crossed
                      options:
                          activation_strategy: error
                          handler: app.sink
                    - type: stream
                      options:
                          stream: stderr
                          level: critical
                          formatter:
                              type: json
                processors:
                    - type: psr_log_message
                    - type: tag
                      options:
                          tags: [example]
    "#;
    let loggers = configurator.configure_from_yaml(config_yaml)?;
    let app = loggers.get("app").ok_or("logger app was not configured")?;

    app.info("user {user} signed in")?;
    assert!(sink.records().is_empty());

    app.error("payment service unreachable")?;
    for line in sink.formatted() {
        print!("{line}");
    }

    println!("All the configured loggers were created successfully. Closing...");
    loggers.close()?;
    Ok(())
}
