//! JSON <-> Eson value conversion

use crate::{Map, Value};

/// Convert a `serde_json` value. Integers that fit `i64` stay integers.
pub fn json_to_eson(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::Array(arr.into_iter().map(json_to_eson).collect())
        }
        serde_json::Value::Object(obj) => Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, json_to_eson(v)))
                .collect::<Map>(),
        ),
    }
}

/// Convert to a `serde_json` value.
///
/// Dates become RFC 3339 strings. Non-finite floats, interpolations and
/// placeholders have no JSON form and become `null`.
pub fn eson_to_json(v: Value) -> serde_json::Value {
    match v {
        Value::Null | Value::Interpolated(_) | Value::Ellipsis => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Date(date) => serde_json::Value::String(date.to_rfc3339()),
        Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(eson_to_json).collect())
        }
        Value::Object(obj) => serde_json::Value::Object(
            obj.into_iter()
                .map(|(k, v)| (k, eson_to_json(v)))
                .collect(),
        ),
    }
}
