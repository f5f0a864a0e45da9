use logwire::Level;

use crate::{FactoryError, FactoryResult, Options, Value};

/// Typed, validating access to a factory's options.
///
/// Missing keys and explicit `null`s are treated alike.
#[derive(Clone, Copy, Debug)]
pub struct OptionsReader<'a> {
    options: Option<&'a Options>,
}

fn must_be_map() -> FactoryError {
    FactoryError::not_created("Options must be an Array")
}

impl<'a> OptionsReader<'a> {
    /// Options of a factory with required keys: they must be a map.
    pub fn required(options: Option<&'a Value>) -> FactoryResult<Self> {
        match options {
            Some(Value::Map(map)) => Ok(OptionsReader { options: Some(map) }),
            _ => Err(must_be_map()),
        }
    }

    /// Options of a factory without required keys: missing options count as
    /// empty, anything but a map is rejected.
    pub fn optional(options: Option<&'a Value>) -> FactoryResult<Self> {
        match options {
            None | Some(Value::Null) => Ok(OptionsReader { options: None }),
            Some(Value::Map(map)) => Ok(OptionsReader { options: Some(map) }),
            Some(_) => Err(must_be_map()),
        }
    }

    /// The raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.options
            .and_then(|options| options.get(key))
            .filter(|value| !value.is_null())
    }

    /// Whether `key` holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The raw value of a required `key`.
    pub fn required_value(&self, key: &str) -> FactoryResult<&'a Value> {
        self.get(key)
            .ok_or_else(|| FactoryError::not_created(format!("No {key} provided")))
    }

    /// An optional string.
    pub fn string(&self, key: &str) -> FactoryResult<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(FactoryError::not_created(format!("{key} must be a String"))),
        }
    }

    /// A required string.
    pub fn required_string(&self, key: &str) -> FactoryResult<String> {
        self.string(key)?
            .ok_or_else(|| FactoryError::not_created(format!("No {key} provided")))
    }

    /// A boolean, `default` when missing.
    pub fn bool(&self, key: &str, default: bool) -> FactoryResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(FactoryError::not_created(format!("{key} must be a Boolean"))),
        }
    }

    /// An optional level, given by name or number.
    pub fn optional_level(&self, key: &str) -> FactoryResult<Option<Level>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => parse_level(key, value).map(Some),
        }
    }

    /// A level, `default` when missing.
    pub fn level(&self, key: &str, default: Level) -> FactoryResult<Level> {
        Ok(self.optional_level(key)?.unwrap_or(default))
    }

    /// A non-negative integer, `default` when missing.
    pub fn u64(&self, key: &str, default: u64) -> FactoryResult<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Int(i)) => u64::try_from(*i).map_err(|_| {
                FactoryError::not_created(format!("{key} must be a positive Integer"))
            }),
            Some(_) => Err(FactoryError::not_created(format!("{key} must be an Integer"))),
        }
    }

    /// A non-negative integer, `default` when missing.
    pub fn usize(&self, key: &str, default: usize) -> FactoryResult<usize> {
        let value = self.u64(key, default as u64)?;
        usize::try_from(value)
            .map_err(|_| FactoryError::not_created(format!("{key} is too large")))
    }

    /// A non-negative integer fitting 32 bits, `default` when missing.
    pub fn u32(&self, key: &str, default: u32) -> FactoryResult<u32> {
        let value = self.u64(key, u64::from(default))?;
        u32::try_from(value)
            .map_err(|_| FactoryError::not_created(format!("{key} is too large")))
    }

    /// A number, `default` when missing.
    pub fn f64(&self, key: &str, default: f64) -> FactoryResult<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| FactoryError::not_created(format!("{key} must be a Number"))),
        }
    }

    /// A list of strings; a single string counts as a one item list.
    pub fn strings(&self, key: &str) -> FactoryResult<Vec<String>> {
        let invalid = || FactoryError::not_created(format!("{key} must be an Array of Strings"));
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::List(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}

/// Parses a level given by name (any case) or number.
pub(crate) fn parse_level(key: &str, value: &Value) -> FactoryResult<Level> {
    let parsed = match value {
        Value::String(s) => s.parse::<Level>(),
        Value::Int(i) => i.to_string().parse::<Level>(),
        _ => return Err(FactoryError::not_created(format!("{key} must be a Level name or number"))),
    };
    parsed.map_err(|err| FactoryError::not_created_with(format!("Invalid {key}: {err}"), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some(Value::Null))]
    #[case(Some(Value::from("stream")))]
    #[case(Some(Value::from(true)))]
    #[case(Some(Value::List(vec![])))]
    fn required_options_must_be_a_map(#[case] options: Option<Value>) {
        let err = OptionsReader::required(options.as_ref()).unwrap_err();
        assert_eq!(err.to_string(), "Options must be an Array");
    }

    #[test]
    fn optional_options_accept_nothing() {
        let reader = OptionsReader::optional(None).unwrap();
        assert_eq!(reader.level("level", Level::Debug).unwrap(), Level::Debug);
        assert!(reader.bool("bubble", true).unwrap());
        assert!(OptionsReader::optional(Some(&Value::from(1))).is_err());
    }

    #[test]
    fn typed_getters() {
        let value = options! {
            "stream" => "stderr",
            "level" => "WARNING",
            "numeric_level" => 400,
            "bubble" => false,
            "max_files" => 7,
            "timeout" => 1,
            "tags" => vec![Value::from("a"), Value::from("b")],
            "nothing" => Value::Null,
        };
        let reader = OptionsReader::required(Some(&value)).unwrap();

        assert_eq!(reader.required_string("stream").unwrap(), "stderr");
        assert_eq!(reader.level("level", Level::Debug).unwrap(), Level::Warning);
        assert_eq!(reader.level("numeric_level", Level::Debug).unwrap(), Level::Error);
        assert!(!reader.bool("bubble", true).unwrap());
        assert_eq!(reader.usize("max_files", 0).unwrap(), 7);
        assert_eq!(reader.f64("timeout", 0.0).unwrap(), 1.0);
        assert_eq!(reader.strings("tags").unwrap(), vec!["a", "b"]);
        assert!(!reader.contains("nothing"));
    }

    #[test]
    fn shape_errors_name_the_key() {
        let value = options! { "bubble" => "yes", "level" => "loud", "max_files" => -1 };
        let reader = OptionsReader::required(Some(&value)).unwrap();

        assert_eq!(
            reader.bool("bubble", true).unwrap_err().to_string(),
            "bubble must be a Boolean"
        );
        assert_eq!(
            reader.required_string("stream").unwrap_err().to_string(),
            "No stream provided"
        );
        assert!(reader
            .level("level", Level::Debug)
            .unwrap_err()
            .to_string()
            .contains("is not defined"));
        assert_eq!(
            reader.usize("max_files", 0).unwrap_err().to_string(),
            "max_files must be a positive Integer"
        );
    }
}
