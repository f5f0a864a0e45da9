//! # Option values
//!
//! Configuration reaches factories as a [`Value`] tree: the scalars and
//! collections a YAML document can hold, plus [`Instance`]s for objects that
//! were built beforehand (a Redis client, a formatter, a whole handler).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

/// String keyed options, in configuration order.
pub type Options = IndexMap<String, Value>;

/// A configuration value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string, also used to name container services.
    String(String),
    /// An ordered list.
    List(Vec<Value>),
    /// String keyed options.
    Map(Options),
    /// A pre-built object.
    Instance(Instance),
}

impl Value {
    /// Wraps a pre-built object.
    pub fn instance<T: Any + Send + Sync>(value: T) -> Self {
        Value::Instance(Instance::new(value))
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Int(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Instance(instance) => instance.type_name(),
        }
    }

    /// Whether the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The options, if the value is a map.
    pub fn as_map(&self) -> Option<&Options> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// The items, if the value is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// The string, if the value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean, if the value is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if the value is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The number, if the value is an integer or a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The instance, if the value is one.
    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(instance) => Some(instance),
            _ => None,
        }
    }

    /// Looks up `key` when the value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }
}

/// A shared, type erased object.
///
/// Trait objects are stored as their `Arc`, e.g. `Arc<dyn Handler>`, so that
/// [`Instance::downcast`] hands back the very same object.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    /// Wraps `value`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Instance {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Name of the stored type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// A reference to the stored value, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// A clone of the stored value, if it is a `T`.
    pub fn downcast<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.type_name)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Options> for Value {
    fn from(value: Options) -> Self {
        Value::Map(value)
    }
}

impl From<Instance> for Value {
    fn from(value: Instance) -> Self {
        Value::Instance(value)
    }
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Value::Map(
                mapping
                    .into_iter()
                    .map(|(key, value)| (yaml_key(key), Value::from(value)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_owned(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Builds a [`Value::Map`] from `key => value` pairs.
///
/// ```rust
/// use logwire_factory::{options, Value};
///
/// let options = options! {
///     "stream" => "stderr",
///     "level" => "warning",
///     "bubble" => false,
/// };
/// assert_eq!(options.get("stream").and_then(Value::as_str), Some("stderr"));
/// ```
#[macro_export]
macro_rules! options {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Options::new();
        $(
            map.insert(::std::string::String::from($key), $crate::Value::from($value));
        )*
        $crate::Value::Map(map)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_yaml_trees() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
            type: stream
            enabled: true
            options:
              level: 300
              ratio: 0.5
              tags: [a, b]
              1: numeric key
            "#,
        )
        .unwrap();
        let value = Value::from(yaml);

        assert_eq!(value.get("type").and_then(Value::as_str), Some("stream"));
        assert_eq!(value.get("enabled").and_then(Value::as_bool), Some(true));
        let options = value.get("options").unwrap();
        assert_eq!(options.get("level").and_then(Value::as_i64), Some(300));
        assert_eq!(options.get("ratio").and_then(Value::as_f64), Some(0.5));
        assert_eq!(options.get("tags").and_then(Value::as_list).map(<[Value]>::len), Some(2));
        assert_eq!(options.get("1").and_then(Value::as_str), Some("numeric key"));
    }

    #[test]
    fn instances_keep_identity() {
        let shared = Arc::new(String::from("client"));
        let value = Value::instance(shared.clone());

        let instance = value.as_instance().unwrap();
        assert!(instance.is::<Arc<String>>());
        assert!(!instance.is::<String>());
        let back: Arc<String> = instance.downcast().unwrap();
        assert!(Arc::ptr_eq(&shared, &back));
        assert_eq!(value.kind(), std::any::type_name::<Arc<String>>());
    }

    #[test]
    fn options_macro_keeps_order() {
        let value = options! { "b" => 1, "a" => "x", "c" => true };
        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
