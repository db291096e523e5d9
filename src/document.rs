//! # Document Tree
//!
//! A closed, key-ordered tree that sits between a [`Chart`](crate::Chart) and
//! the markup codecs in [`xml`](crate::xml) and [`json`](crate::json).
//!
//! ## Type Hierarchy
//! ```text
//! Value
//!   ├── Int(i64)
//!   ├── Float(f64)
//!   ├── Text(String)
//!   ├── List(Vec<Value>)
//!   └── Map(Map)
//!         └── Vec<(String, Value)>  (insertion order is output order)
//! ```
//!
//! Encoders emit keys and list items in exactly the order stored here, so the
//! export routine alone decides the layout of the output document.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Numeric view; integers widen to `f64` and text is parsed.
    ///
    /// Markup leaves carry no type, so numbers read from XML arrive as text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Integer view; floats are accepted only when they hold a whole number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => whole(*f),
            Value::Text(s) => s.trim().parse().ok().or_else(|| parse_number(s).and_then(whole)),
            _ => None,
        }
    }

    /// Text view; scalars are rendered, containers have none
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Value::List(items) => format!("list of {} items", items.len()),
            Value::Map(map) => format!("map of {} keys", map.len()),
            scalar => scalar.as_text().unwrap_or_default(),
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    // keeps words like "inf" or "NaN" as text
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn whole(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

/// Insertion-ordered string-keyed map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: Vec<(String, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Map::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
        }
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            out.serialize_entry(key, value)?;
        }
        out.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_insertion_order() {
        let map = Map::new().with("b", 1i64).with("a", 2i64).with("c", 3i64);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_map_insert_replaces_in_place() {
        let mut map = Map::new().with("x", 1i64).with("y", 2i64);
        map.insert("x", "changed");
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(map.get("x"), Some(&Value::Text("changed".to_string())));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_scalar_views() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(2.0).as_i64(), Some(2));
        assert_eq!(Value::Float(2.5).as_i64(), None);
        assert_eq!(Value::Float(2.5).as_text(), Some("2.5".to_string()));
        assert_eq!(Value::Text("x".into()).as_f64(), None);
        assert_eq!(Value::Text("inf".into()).as_f64(), None);
        assert_eq!(Value::Text(" 0.25 ".into()).as_f64(), Some(0.25));
        assert_eq!(Value::Text("-1".into()).as_i64(), Some(-1));
        assert_eq!(Value::Text("4.0".into()).as_i64(), Some(4));
        assert_eq!(Value::List(vec![]).as_text(), None);
    }
}
