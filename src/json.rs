//! JSON form of the chart document, with the same keys as the XML form.

use crate::document::{Map, Value};
use crate::error::MergeError;

/// Pretty-printed JSON, keys in document order
pub fn to_json(document: &Value) -> Result<String, MergeError> {
    serde_json::to_string_pretty(document).map_err(|e| MergeError::Json(e.to_string()))
}

pub fn parse_json(source: &str) -> Result<Value, MergeError> {
    let raw: serde_json::Value =
        serde_json::from_str(source).map_err(|e| MergeError::Json(e.to_string()))?;
    Ok(from_json_value(raw))
}

fn from_json_value(raw: serde_json::Value) -> Value {
    match raw {
        serde_json::Value::Null => Value::Text(String::new()),
        serde_json::Value::Bool(b) => Value::Int(b as i64),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float))
            .unwrap_or_else(|| Value::Text(n.to_string())),
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_json_value).collect())
        }
        serde_json::Value::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key, from_json_value(value));
            }
            Value::Map(map)
        }
    }
}
