//! Conversion between plain JSON and the typed value envelopes of the
//! Firestore REST API.
//!
//! A REST document wraps every field in a kind marker, e.g.
//! `{"stringValue": "x"}` or `{"mapValue": {"fields": {...}}}`. Records are
//! serialized to plain JSON first and pass through this codec on the way in
//! and out of the document store.

use serde_json::{json, Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("documents must be JSON objects, got {0}")]
    NotAnObject(&'static str),

    #[error("unsupported document value: {0}")]
    UnsupportedValue(String),

    #[error("invalid integerValue: {0}")]
    InvalidInteger(String),
}

/// Wraps a JSON object into the `{"fields": ...}` document shape.
pub fn to_document(value: &Value) -> Result<Value, CodecError> {
    let Value::Object(map) = value else {
        return Err(CodecError::NotAnObject(kind_of(value)));
    };
    Ok(json!({ "fields": encode_map(map)? }))
}

/// Rebuilds plain JSON from a REST document. A document with no `fields`
/// key decodes to an empty object.
pub fn from_document(doc: &Value) -> Result<Value, CodecError> {
    match doc.get("fields") {
        Some(Value::Object(fields)) => decode_map(fields),
        _ => Ok(json!({})),
    }
}

fn encode_map(map: &Map<String, Value>) -> Result<Value, CodecError> {
    let mut fields = Map::new();
    for (key, value) in map {
        fields.insert(key.clone(), encode_value(value)?);
    }
    Ok(Value::Object(fields))
}

fn encode_value(value: &Value) -> Result<Value, CodecError> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                // The REST API carries 64-bit integers as strings.
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values = items
                .iter()
                .map(encode_value)
                .collect::<Result<Vec<_>, _>>()?;
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_map(map)? } }),
    })
}

fn decode_map(fields: &Map<String, Value>) -> Result<Value, CodecError> {
    let mut out = Map::new();
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(Value::Object(out))
}

fn decode_value(value: &Value) -> Result<Value, CodecError> {
    let Value::Object(map) = value else {
        return Err(CodecError::UnsupportedValue(value.to_string()));
    };
    let Some((kind, inner)) = map.iter().next() else {
        return Err(CodecError::UnsupportedValue("{}".to_string()));
    };

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "stringValue" | "doubleValue" => inner.clone(),
        // Timestamps come back as RFC 3339 strings and stay strings here.
        "timestampValue" => inner.clone(),
        "integerValue" => {
            let raw = inner.as_str().unwrap_or_default();
            let parsed: i64 = raw
                .parse()
                .map_err(|_| CodecError::InvalidInteger(raw.to_string()))?;
            Value::Number(parsed.into())
        }
        "mapValue" => match inner.get("fields") {
            Some(Value::Object(fields)) => decode_map(fields)?,
            _ => json!({}),
        },
        "arrayValue" => {
            let items = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Value::Array(items)
        }
        other => return Err(CodecError::UnsupportedValue(other.to_string())),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
