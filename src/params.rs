//! Request parameters and their wire encoding.

use crate::Error;
use serde_json::Value;

/// A single parameter value: a scalar or an array of values.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<ParamValue>),
}

impl ParamValue {
    /// Returns the string form of a scalar, `None` for lists.
    pub fn as_scalar_string(&self) -> Option<String> {
        match self {
            ParamValue::String(s) => Some(s.clone()),
            ParamValue::Int(n) => Some(n.to_string()),
            ParamValue::Float(f) => Some(f.to_string()),
            ParamValue::Bool(b) => Some(b.to_string()),
            ParamValue::List(_) => None,
        }
    }

    fn encode_into(&self, key: &str, pairs: &mut Vec<(String, String)>) {
        match self {
            ParamValue::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    item.encode_into(&format!("{}[{}]", key, index), pairs);
                }
            }
            scalar => {
                if let Some(value) = scalar.as_scalar_string() {
                    pairs.push((key.to_string(), value));
                }
            }
        }
    }

    fn from_json(key: &str, value: Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(ParamValue::String(s)),
            Value::Bool(b) => Ok(ParamValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ParamValue::Float(f))
                } else {
                    Err(Error::MalformedParameters(format!(
                        "parameter \"{}\" is out of range",
                        key
                    )))
                }
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) | Value::Null => {
                        Err(Error::MalformedParameters(format!(
                            "parameter \"{}\" must only contain scalars",
                            key
                        )))
                    }
                    scalar => ParamValue::from_json(key, scalar),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ParamValue::List),
            Value::Null => Err(Error::MalformedParameters(format!(
                "parameter \"{}\" is null",
                key
            ))),
            Value::Object(_) => Err(Error::MalformedParameters(format!(
                "parameter \"{}\" is a nested object",
                key
            ))),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::Int(value as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// An ordered mapping of parameter names to values.
///
/// Inserting a key that already exists replaces its value in place, so the
/// wire order is the order in which keys were first inserted.
///
/// # Examples
///
/// ```
/// use mailjet::Params;
///
/// let params = Params::new()
///     .with("contact", "a@example.com")
///     .with("id", 42)
///     .with("force", true);
///
/// assert_eq!(
///     params.to_pairs(),
///     vec![
///         ("contact".to_string(), "a@example.com".to_string()),
///         ("id".to_string(), "42".to_string()),
///         ("force".to_string(), "true".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter and returns the mapping, for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reads a required string argument.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedParameters`] if the key is missing or not a
    /// scalar.
    pub fn require_str(&self, key: &str) -> Result<String, Error> {
        self.get(key)
            .ok_or_else(|| missing(key))?
            .as_scalar_string()
            .ok_or_else(|| mistyped(key, "a scalar"))
    }

    /// Reads a required integer argument. Numeric strings are accepted.
    pub fn require_i64(&self, key: &str) -> Result<i64, Error> {
        match self.get(key).ok_or_else(|| missing(key))? {
            ParamValue::Int(n) => Ok(*n),
            ParamValue::String(s) => s.trim().parse().map_err(|_| mistyped(key, "an integer")),
            _ => Err(mistyped(key, "an integer")),
        }
    }

    /// Reads an optional boolean argument, defaulting to `false` when absent.
    /// `1`/`0` and `"true"`/`"false"` are accepted.
    pub fn flag(&self, key: &str) -> Result<bool, Error> {
        match self.get(key) {
            None => Ok(false),
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(ParamValue::Int(0)) => Ok(false),
            Some(ParamValue::Int(1)) => Ok(true),
            Some(ParamValue::String(s)) => match s.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" | "" => Ok(false),
                _ => Err(mistyped(key, "a boolean")),
            },
            Some(_) => Err(mistyped(key, "a boolean")),
        }
    }

    /// Encodes the parameters as `(name, value)` pairs for a query string or
    /// a form body. Arrays use indexed keys: `key[0]`, `key[1]`, ...
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            value.encode_into(key, &mut pairs);
        }
        pairs
    }
}

fn missing(key: &str) -> Error {
    Error::MalformedParameters(format!("missing required parameter \"{}\"", key))
}

fn mistyped(key: &str, expected: &str) -> Error {
    Error::MalformedParameters(format!("parameter \"{}\" must be {}", key, expected))
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl TryFrom<Value> for Params {
    type Error = Error;

    /// Converts a JSON object into parameters. `null` yields an empty
    /// mapping; any other non-object is rejected.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Params::new()),
            Value::Object(map) => {
                let mut params = Params::new();
                for (key, value) in map {
                    let value = ParamValue::from_json(&key, value)?;
                    params.insert(key, value);
                }
                Ok(params)
            }
            other => Err(Error::MalformedParameters(format!(
                "parameters should be a mapping, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", 2);
        params.insert("a", "x");
        assert_eq!(
            params.to_pairs(),
            vec![
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "2".to_string())
            ]
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_arrays_use_indexed_keys() {
        let params = Params::new().with("ids", vec![3, 5]);
        assert_eq!(
            params.to_pairs(),
            vec![
                ("ids[0]".to_string(), "3".to_string()),
                ("ids[1]".to_string(), "5".to_string())
            ]
        );
    }

    #[test]
    fn test_try_from_json_object() {
        let params = Params::try_from(json!({"contact": "a@example.com", "id": 42, "force": true}))
            .unwrap();
        assert_eq!(params.require_str("contact").unwrap(), "a@example.com");
        assert_eq!(params.require_i64("id").unwrap(), 42);
        assert!(params.flag("force").unwrap());
    }

    #[test]
    fn test_try_from_rejects_non_mappings() {
        for value in [json!("text"), json!([1, 2]), json!(3), json!(true)] {
            assert!(matches!(
                Params::try_from(value),
                Err(Error::MalformedParameters(_))
            ));
        }
        assert!(Params::try_from(json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_try_from_rejects_nested_values() {
        assert!(matches!(
            Params::try_from(json!({"filter": {"status": "active"}})),
            Err(Error::MalformedParameters(_))
        ));
        assert!(matches!(
            Params::try_from(json!({"ids": [[1]]})),
            Err(Error::MalformedParameters(_))
        ));
        assert!(matches!(
            Params::try_from(json!({"name": null})),
            Err(Error::MalformedParameters(_))
        ));
    }

    #[test]
    fn test_required_arguments() {
        let params = Params::new().with("id", "17").with("tags", vec!["a"]);
        assert_eq!(params.require_i64("id").unwrap(), 17);
        assert!(matches!(
            params.require_str("contact"),
            Err(Error::MalformedParameters(_))
        ));
        assert!(matches!(
            params.require_str("tags"),
            Err(Error::MalformedParameters(_))
        ));
        assert!(!params.flag("force").unwrap());
    }

    #[test]
    fn test_collect_and_iterate_in_order() {
        let params: Params = [("limit", 10), ("start", 20), ("limit", 5)].into_iter().collect();
        assert_eq!(params.len(), 2);
        assert!(params.contains_key("start"));
        assert!(!params.contains_key("orderby"));

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["limit", "start"]);
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(5)));
    }
}
