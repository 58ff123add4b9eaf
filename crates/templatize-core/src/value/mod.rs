//! Bound data
//!
//! `Value` is the data tree a template renders against. It mirrors JSON with
//! one addition: `Function`, a lazily evaluated binding or a function that
//! values are passed to with `->`.

mod convert;
mod lambda;

pub use lambda::{evaluate, FunctionPolicy, Lambda, MAX_NESTED_CALLS};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;

/// Data bound to a template
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null or undefined
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
    Function(Lambda),
}

impl Value {
    /// Empty record
    pub fn object() -> Self {
        Value::Object(HashMap::new())
    }

    /// Builder: set a field on a record (no-op on other kinds)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Wrap a closure as a bound function
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> anyhow::Result<Value> + 'static,
    {
        Value::Function(Lambda::new(f))
    }

    /// Convert any serializable value
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Value::from)
    }

    /// Field lookup on a record
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Kind name used in log messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Values that render as nothing: null, false, empty string, NaN
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty(),
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Plain string conversion before formatting
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_plain_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object]".to_string(),
            Value::Function(_) => "[function]".to_string(),
        }
    }
}

/// Shortest decimal form; integral values print without a fraction.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{sign}Infinity")
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Function(_) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_strings() {
        assert_eq!(Value::Null.to_plain_string(), "");
        assert_eq!(Value::from(3).to_plain_string(), "3");
        assert_eq!(Value::from(2.5).to_plain_string(), "2.5");
        assert_eq!(Value::from(-0.0).to_plain_string(), "0");
        assert_eq!(Value::from(json!([1, "a", [2, 3]])).to_plain_string(), "1,a,2,3");
        assert_eq!(Value::object().to_plain_string(), "[object]");
        assert_eq!(Value::function(|_, _| Ok(Value::Null)).to_plain_string(), "[function]");
    }

    #[test]
    fn test_blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::from(false).is_blank());
        assert!(Value::from("").is_blank());
        assert!(Value::Number(f64::NAN).is_blank());
        assert!(!Value::from(0).is_blank());
        assert!(!Value::from(" ").is_blank());
    }

    #[test]
    fn test_builder() {
        let v = Value::object().with("name", "World").with("n", 2);
        assert_eq!(v.get("name"), Some(&Value::from("World")));
        assert_eq!(v.get("n"), Some(&Value::Number(2.0)));
        assert_eq!(v.get("missing"), None);
    }

    #[test]
    fn test_serialize_drops_functions() {
        let v = Value::object()
            .with("a", vec![1, 2])
            .with("f", Value::function(|_, _| Ok(Value::Null)));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json, json!({"a": [1.0, 2.0], "f": null}));
    }
}
