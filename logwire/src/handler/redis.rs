use std::fmt::Debug;
use std::sync::Arc;

use crate::handler::{impl_core_handler, Handler, HandlerCore};
use crate::{Level, LogRecord, LogResult};

/// The subset of a Redis client the Redis handlers need.
///
/// Implement it over the Redis library in use; errors are reported as
/// [`LogError::ClientFailed`](crate::LogError::ClientFailed).
pub trait RedisClient: Send + Sync + Debug {
    /// Appends `value` to the list at `key`.
    fn rpush(&self, key: &str, value: &str) -> LogResult<()>;

    /// Trims the list at `key` to the inclusive range `start..=stop`.
    fn ltrim(&self, key: &str, start: i64, stop: i64) -> LogResult<()>;

    /// Publishes `message` on `channel`.
    fn publish(&self, channel: &str, message: &str) -> LogResult<()>;
}

/// Pushes formatted records onto a Redis list, optionally capped.
#[derive(Debug)]
pub struct RedisHandler {
    core: HandlerCore,
    client: Arc<dyn RedisClient>,
    key: String,
    cap_size: Option<usize>,
}

impl RedisHandler {
    /// Creates a handler pushing to the list at `key`.
    pub fn new(
        client: Arc<dyn RedisClient>,
        key: impl Into<String>,
        level: Level,
        bubble: bool,
    ) -> Self {
        RedisHandler {
            core: HandlerCore::new(level, bubble),
            client,
            key: key.into(),
            cap_size: None,
        }
    }

    /// Keeps only the last `cap_size` entries of the list. `0` disables it.
    pub fn with_cap_size(mut self, cap_size: usize) -> Self {
        self.cap_size = (cap_size > 0).then_some(cap_size);
        self
    }

    /// The Redis client.
    pub fn client(&self) -> &Arc<dyn RedisClient> {
        &self.client
    }

    /// The list key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Maximum list length, if capped.
    pub fn cap_size(&self) -> Option<usize> {
        self.cap_size
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }
}

impl Handler for RedisHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.client.rpush(&self.key, &self.core.format(&record))?;
        if let Some(cap) = self.cap_size {
            let start = i64::try_from(cap).map_or(i64::MIN, |cap| -cap);
            self.client.ltrim(&self.key, start, -1)?;
        }
        Ok(!self.core.bubble())
    }
}

impl_core_handler!(RedisHandler);

/// Publishes formatted records on a Redis channel.
#[derive(Debug)]
pub struct RedisPubSubHandler {
    core: HandlerCore,
    client: Arc<dyn RedisClient>,
    channel: String,
}

impl RedisPubSubHandler {
    /// Creates a handler publishing on `channel`.
    pub fn new(
        client: Arc<dyn RedisClient>,
        channel: impl Into<String>,
        level: Level,
        bubble: bool,
    ) -> Self {
        RedisPubSubHandler {
            core: HandlerCore::new(level, bubble),
            client,
            channel: channel.into(),
        }
    }

    /// The Redis client.
    pub fn client(&self) -> &Arc<dyn RedisClient> {
        &self.client
    }

    /// The publish channel.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Minimum level handled.
    pub fn level(&self) -> Level {
        self.core.level()
    }

    /// Whether handled records keep bubbling.
    pub fn bubble(&self) -> bool {
        self.core.bubble()
    }
}

impl Handler for RedisPubSubHandler {
    fn is_handling(&self, record: &LogRecord) -> bool {
        self.core.is_handling(record)
    }

    fn handle(&self, record: LogRecord) -> LogResult<bool> {
        if !self.is_handling(&record) {
            return Ok(false);
        }
        let record = self.core.process(record);
        self.client.publish(&self.channel, &self.core.format(&record))?;
        Ok(!self.core.bubble())
    }
}

impl_core_handler!(RedisPubSubHandler);

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every command it receives.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingRedis {
        pub(crate) commands: Mutex<Vec<String>>,
    }

    impl RedisClient for RecordingRedis {
        fn rpush(&self, key: &str, value: &str) -> LogResult<()> {
            self.commands.lock().unwrap().push(format!("RPUSH {key} {value}"));
            Ok(())
        }

        fn ltrim(&self, key: &str, start: i64, stop: i64) -> LogResult<()> {
            self.commands.lock().unwrap().push(format!("LTRIM {key} {start} {stop}"));
            Ok(())
        }

        fn publish(&self, channel: &str, message: &str) -> LogResult<()> {
            self.commands.lock().unwrap().push(format!("PUBLISH {channel} {message}"));
            Ok(())
        }
    }

    fn plain(handler: &mut dyn crate::FormattableHandler) {
        handler.set_formatter(Arc::new(crate::formatter::LineFormatter::new(
            Some("%message%".into()),
            None,
        )));
    }

    #[test]
    fn pushes_and_caps() {
        let redis = Arc::new(RecordingRedis::default());
        let mut handler =
            RedisHandler::new(redis.clone(), "logs", Level::Info, true).with_cap_size(10);
        plain(&mut handler);

        handler.handle(LogRecord::new("app", Level::Debug, "skipped")).unwrap();
        handler.handle(LogRecord::new("app", Level::Warning, "kept")).unwrap();

        assert_eq!(
            *redis.commands.lock().unwrap(),
            vec!["RPUSH logs kept".to_owned(), "LTRIM logs -10 -1".to_owned()]
        );
    }

    #[test]
    fn publishes() {
        let redis = Arc::new(RecordingRedis::default());
        let mut handler = RedisPubSubHandler::new(redis.clone(), "events", Level::Debug, false);
        plain(&mut handler);

        assert!(handler.handle(LogRecord::new("app", Level::Info, "hello")).unwrap());
        assert_eq!(*redis.commands.lock().unwrap(), vec!["PUBLISH events hello".to_owned()]);
    }
}
