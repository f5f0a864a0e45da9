use serde_json::Value;

use crate::processor::Processor;
use crate::LogRecord;

/// Adds a fixed list of tags to `extra.tags`.
#[derive(Clone, Debug, Default)]
pub struct TagProcessor {
    tags: Vec<String>,
}

impl TagProcessor {
    /// Creates a processor adding `tags`.
    pub fn new(tags: Vec<String>) -> Self {
        TagProcessor { tags }
    }

    /// Appends tags.
    pub fn add_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        self.tags.extend(tags);
    }

    /// The configured tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Processor for TagProcessor {
    fn process(&self, mut record: LogRecord) -> LogRecord {
        record.extra.insert(
            "tags".into(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use serde_json::json;

    #[test]
    fn adds_tags() {
        let mut processor = TagProcessor::new(vec!["web".into()]);
        processor.add_tags(["eu".to_owned()]);
        let record = processor.process(LogRecord::new("app", Level::Info, "x"));
        assert_eq!(record.extra["tags"], json!(["web", "eu"]));
    }
}
