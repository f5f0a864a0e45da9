//! # Mailer handler factory

use std::sync::Arc;

use logwire::handler::{Mailer, MailerHandler};
use logwire::Level;

use crate::handler::decorate;
use crate::plugin_manager::HandlerFactory;
use crate::resolve::{resolve_mail_message, resolve_service};
use crate::{FactoryResult, OptionsReader, ServiceContainer, Value};

/// Factory for [`MailerHandler`]s.
///
/// `mailer` is an `Arc<dyn Mailer>` instance or service name. `message` is
/// a `MailMessage` instance, a service name, or a map with `from`, `to`,
/// `subject` and `content_type`.
#[derive(Debug)]
pub struct MailerHandlerFactory {}

impl MailerHandlerFactory {
    /// Creates a new MailerHandlerFactory
    pub fn new() -> Self {
        MailerHandlerFactory {}
    }
}

impl Default for MailerHandlerFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerFactory for MailerHandlerFactory {
    type Handler = MailerHandler;

    fn create_handler(
        &self,
        container: &ServiceContainer,
        _requested_name: &str,
        options: Option<&Value>,
    ) -> FactoryResult<MailerHandler> {
        let reader = OptionsReader::required(options)?;
        let mailer: Arc<dyn Mailer> =
            resolve_service(container, reader.required_value("mailer")?, "mailer", "Mailer")?;
        let message = resolve_mail_message(container, reader.required_value("message")?)?;
        let handler = MailerHandler::new(
            mailer,
            message,
            reader.level("level", Level::Debug)?,
            reader.bool("bubble", true)?,
        );
        decorate(handler, container, &reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use logwire::handler::MailMessage;
    use logwire::{Handler, LogRecord, LogResult};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct MockMailer {
        sent: Mutex<Vec<MailMessage>>,
    }

    impl Mailer for MockMailer {
        fn send(&self, message: &MailMessage) -> LogResult<()> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn container(mock: Arc<MockMailer>) -> ServiceContainer {
        let mailer: Arc<dyn Mailer> = mock;
        let mut container = ServiceContainer::with_defaults();
        container.set_value("mailer", mailer);
        container
    }

    #[test]
    fn message_from_options() {
        let mock = Arc::new(MockMailer::default());
        let options = options! {
            "mailer" => "mailer",
            "message" => options! {
                "from" => "app@example.com",
                "to" => vec![Value::from("ops@example.com"), Value::from("dev@example.com")],
                "subject" => "[%level_name%] %channel%",
            },
            "level" => "critical",
        };
        let handler = MailerHandlerFactory::new()
            .create_handler(&container(mock.clone()), "mailer", Some(&options))
            .unwrap();
        assert_eq!(handler.message().to.len(), 2);

        handler.handle(LogRecord::new("billing", Level::Alert, "ledger drift")).unwrap();
        let sent = mock.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[ALERT] billing");
    }

    #[test]
    fn message_from_the_container() {
        let mock = Arc::new(MockMailer::default());
        let mut container = container(mock);
        let template = MailMessage::new("app@example.com", vec!["ops@example.com".into()], "alert");
        container.set_value("alert_message", template.clone());

        let options = options! { "mailer" => "mailer", "message" => "alert_message" };
        let handler = MailerHandlerFactory::new()
            .create_handler(&container, "mailer", Some(&options))
            .unwrap();
        assert_eq!(handler.message(), &template);
    }

    #[test]
    fn message_is_required() {
        let options = options! { "mailer" => "mailer" };
        let err = MailerHandlerFactory::new()
            .create_handler(&container(Arc::new(MockMailer::default())), "mailer", Some(&options))
            .unwrap_err();
        assert_eq!(err.to_string(), "No message provided");
    }
}
