use std::fmt::Debug;
use std::sync::Arc;

use crate::formatter::{Formatter, LineFormatter};
use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogRecord, LogResult};

/// An e-mail, used both as the template of a [`MailerHandler`] and as the
/// message handed to the [`Mailer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject. In templates, record placeholders such as `%level_name%`
    /// are expanded.
    pub subject: String,
    /// MIME type of the body; `text/plain` when empty.
    pub content_type: String,
    /// Message body.
    pub body: String,
}

impl MailMessage {
    /// Creates a plain text message template.
    pub fn new(from: impl Into<String>, to: Vec<String>, subject: impl Into<String>) -> Self {
        MailMessage {
            from: from.into(),
            to,
            subject: subject.into(),
            content_type: "text/plain".to_owned(),
            body: String::new(),
        }
    }
}

/// Sends e-mails.
pub trait Mailer: Send + Sync + Debug {
    /// Sends a message.
    fn send(&self, message: &MailMessage) -> LogResult<()>;
}

/// Sends each record, or each batch of records, as an e-mail.
#[derive(Debug)]
pub struct MailerHandler {
    core: HandlerCore,
    mailer: Arc<dyn Mailer>,
    message: MailMessage,
}

impl MailerHandler {
    /// Creates a handler sending copies of `message`.
    pub fn new(mailer: Arc<dyn Mailer>, message: MailMessage, level: Level, bubble: bool) -> Self {
        MailerHandler {
            core: HandlerCore::new(level, bubble),
            mailer,
            message,
        }
    }

    /// The mailer.
    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    /// The message template.
    pub fn message(&self) -> &MailMessage {
        &self.message
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }

    fn send(&self, body: String, records: &[LogRecord]) -> LogResult<()> {
        let mut message = self.message.clone();
        if let Some(highest) = records.iter().max_by_key(|record| record.level) {
            message.subject = LineFormatter::new(Some(self.message.subject.clone()), None)
                .format(highest)
                .trim_end()
                .to_owned();
        }
        message.body = body;
        self.mailer.send(&message)
    }
}

impl Handler for MailerHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        let body = self.core.format(&record);
        self.send(body, std::slice::from_ref(&record))?;
        Ok(!self.core.bubble())
    }

    fn handle_batch(&self, records: Vec<LogRecord>) -> LogResult<()> {
        let records: Vec<LogRecord> = records
            .into_iter()
            .filter(|record| self.is_handling(record))
            .map(|record| self.core.process(record))
            .collect();
        if records.is_empty() {
            return Ok(());
        }
        let body = self.core.formatter().format_batch(&records);
        self.send(body, &records)
    }
}

impl_core_handler!(MailerHandler);
