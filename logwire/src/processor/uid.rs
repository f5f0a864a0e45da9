use std::sync::RwLock;

use rand::Rng;

use crate::processor::Processor;
use crate::{LogError, LogRecord, LogResult};

/// Adds a random hexadecimal `uid` to `extra`, identical for every record
/// until [`UidProcessor::reset`] is called.
#[derive(Debug)]
pub struct UidProcessor {
    length: usize,
    uid: RwLock<String>,
}

impl UidProcessor {
    /// Default uid length.
    pub const DEFAULT_LENGTH: usize = 7;

    /// Creates a processor generating uids of `length` characters (1 to 32).
    pub fn new(length: usize) -> LogResult<Self> {
        if !(1..=32).contains(&length) {
            return Err(LogError::InvalidArgument(format!(
                "the uid length must be an integer between 1 and 32, got {length}"
            )));
        }
        Ok(UidProcessor {
            length,
            uid: RwLock::new(generate(length)),
        })
    }

    /// The current uid.
    pub fn uid(&self) -> String {
        self.uid
            .read()
            .map(|uid| uid.clone())
            .unwrap_or_default()
    }

    /// Generates a new uid.
    pub fn reset(&self) {
        if let Ok(mut uid) = self.uid.write() {
            *uid = generate(self.length);
        }
    }
}

impl Default for UidProcessor {
    fn default() -> Self {
        UidProcessor {
            length: Self::DEFAULT_LENGTH,
            uid: RwLock::new(generate(Self::DEFAULT_LENGTH)),
        }
    }
}

fn generate(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    rand::rng().fill(&mut bytes[..]);
    let mut uid = const_hex::encode(bytes);
    uid.truncate(length);
    uid
}

impl Processor for UidProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        record.extra.insert("uid".into(), self.uid().into());
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(32)]
    fn generates_uid_of_length(#[case] length: usize) {
        let processor = UidProcessor::new(length).unwrap();
        let record = processor.process(LogRecord::new("app", Level::Info, "x"));
        let uid = record.extra["uid"].as_str().unwrap().to_owned();
        assert_eq!(uid.len(), length);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(uid, processor.uid());
    }

    #[rstest]
    #[case(0)]
    #[case(33)]
    fn rejects_invalid_length(#[case] length: usize) {
        assert!(matches!(
            UidProcessor::new(length),
            Err(LogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn reset_changes_uid() {
        let processor = UidProcessor::new(32).unwrap();
        let before = processor.uid();
        processor.reset();
        assert_ne!(before, processor.uid());
    }
}
