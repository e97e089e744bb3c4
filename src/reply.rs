//! Helpers for pulling typed scalars out of raw reply values.
//!
//! The server answers with untagged nested arrays of bulk strings and
//! integers. These helpers convert single elements and raise decode errors
//! with a description of what was expected, so higher level parsers never
//! index past the end of an array or guess at a type.

use indexmap::IndexMap;
use redis::Value;

use crate::error::{RediSearchError, Result};

/// Describe a value for error messages without dumping large payloads.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Int(_) => "integer",
        Value::BulkString(_) => "bulk string",
        Value::Array(_) => "array",
        Value::SimpleString(_) => "simple string",
        Value::Okay => "OK",
        Value::Map(_) => "map",
        Value::Set(_) => "set",
        Value::Double(_) => "double",
        Value::Boolean(_) => "boolean",
        Value::VerbatimString { .. } => "verbatim string",
        _ => "unsupported value",
    }
}

/// Convert a scalar reply element to a string.
pub fn value_to_string(value: &Value) -> Result<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes.clone())
            .map_err(|err| RediSearchError::decode(format!("invalid UTF-8 in reply: {err}"))),
        Value::SimpleString(status) => Ok(status.clone()),
        Value::Okay => Ok("OK".to_string()),
        Value::Int(v) => Ok(v.to_string()),
        Value::Double(v) => Ok(v.to_string()),
        Value::Boolean(v) => Ok(v.to_string()),
        Value::VerbatimString { text, .. } => Ok(text.clone()),
        other => Err(RediSearchError::decode(format!(
            "expected a string, got {}",
            describe(other)
        ))),
    }
}

/// Like [`value_to_string`], but maps nil to `None`.
pub fn value_to_opt_string(value: &Value) -> Result<Option<String>> {
    match value {
        Value::Nil => Ok(None),
        other => value_to_string(other).map(Some),
    }
}

/// Convert an integer or a numeric string to `i64`.
pub fn value_to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Int(v) => Ok(*v),
        other => {
            let text = value_to_string(other)?;
            text.trim()
                .parse::<i64>()
                .map_err(|_| RediSearchError::decode(format!("expected an integer, got {text:?}")))
        }
    }
}

/// Convert an integer, double or numeric string to `f64`.
pub fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Double(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        other => {
            let text = value_to_string(other)?;
            text.trim()
                .parse::<f64>()
                .map_err(|_| RediSearchError::decode(format!("expected a number, got {text:?}")))
        }
    }
}

/// Borrow the elements of an array reply.
pub fn as_array(value: &Value) -> Result<&[Value]> {
    match value {
        Value::Array(items) | Value::Set(items) => Ok(items),
        other => Err(RediSearchError::decode(format!(
            "expected an array, got {}",
            describe(other)
        ))),
    }
}

/// Zip a flat `[k1, v1, k2, v2, ...]` array into an ordered string map.
///
/// An odd number of elements is a decode error; nil means an empty map.
pub fn pairs_to_map(value: &Value) -> Result<IndexMap<String, String>> {
    if matches!(value, Value::Nil) {
        return Ok(IndexMap::new());
    }
    let items = as_array(value)?;
    if items.len() % 2 != 0 {
        return Err(RediSearchError::decode(format!(
            "key/value array has odd length {}",
            items.len()
        )));
    }
    let mut map = IndexMap::with_capacity(items.len() / 2);
    for chunk in items.chunks_exact(2) {
        let key = value_to_string(&chunk[0])?;
        let val = value_to_opt_string(&chunk[1])?.unwrap_or_default();
        map.insert(key, val);
    }
    Ok(map)
}

/// Convert an array reply of scalars to strings; nil means an empty list.
pub fn value_to_string_list(value: &Value) -> Result<Vec<String>> {
    if matches!(value, Value::Nil) {
        return Ok(Vec::new());
    }
    as_array(value)?.iter().map(value_to_string).collect()
}

/// Render an arbitrary reply as JSON, for display.
///
/// Byte strings that are not UTF-8 are rendered lossily.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    use serde_json::Value as Json;

    match value {
        Value::Nil => Json::Null,
        Value::Int(v) => Json::from(*v),
        Value::Double(v) => Json::from(*v),
        Value::Boolean(v) => Json::Bool(*v),
        Value::Okay => Json::String("OK".to_string()),
        Value::SimpleString(s) => Json::String(s.clone()),
        Value::VerbatimString { text, .. } => Json::String(text.clone()),
        Value::BulkString(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        Value::Array(items) | Value::Set(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
        Value::Map(pairs) => Json::Array(
            pairs
                .iter()
                .map(|(k, v)| Json::Array(vec![value_to_json(k), value_to_json(v)]))
                .collect(),
        ),
        other => Json::String(describe(other).to_string()),
    }
}
