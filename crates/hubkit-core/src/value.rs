//! Typed event payload values
//!
//! Event payloads are maps from string keys to [`Value`], a closed sum over
//! the payload shapes the hub transports. The hub itself treats payloads
//! opaquely; conversion to and from `serde_json::Value` happens at the host
//! boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An event payload: an immutable mapping from string keys to values.
pub type EventData = HashMap<String, Value>;

// ----------------------------------------------------------------------------
// Value
// ----------------------------------------------------------------------------

/// A dynamically typed payload value.
///
/// Integers and floats are kept distinct so payloads round-trip without
/// silently widening `i64` into `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

impl Value {
    /// Returns the contained string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained integer, if this is an integer value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained bool, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained map, if this is a map value.
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

// ----------------------------------------------------------------------------
// JSON Boundary Conversions
// ----------------------------------------------------------------------------

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(n) => serde_json::Value::from(n),
            Value::Float(n) => serde_json::Value::from(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Convenience for building an [`EventData`] map from key/value pairs.
pub fn event_data<const N: usize>(pairs: [(&str, Value); N]) -> EventData {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_and_float_stay_distinct() {
        let json = serde_json::json!({"count": 3, "ratio": 0.5});
        let value = Value::from(json);
        let map = value.as_map().unwrap();
        assert_eq!(map["count"], Value::Int(3));
        assert_eq!(map["ratio"], Value::Float(0.5));
    }

    #[test]
    fn test_json_round_trip() {
        let original = serde_json::json!({
            "name": "hub",
            "enabled": true,
            "retries": 4,
            "tags": ["a", "b"],
            "nested": {"empty": null}
        });
        let converted: serde_json::Value = Value::from(original.clone()).into();
        assert_eq!(converted, original);
    }

    #[test]
    fn test_serde_untagged_representation() {
        let value = Value::List(vec![Value::Null, Value::Bool(true), Value::Int(7)]);
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, "[null,true,7]");

        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_event_data_helper() {
        let data = event_data([("k", Value::from("v")), ("n", Value::from(1i64))]);
        assert_eq!(data.len(), 2);
        assert_eq!(data["k"].as_str(), Some("v"));
    }
}
