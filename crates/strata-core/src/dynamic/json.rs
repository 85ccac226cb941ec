//! JSON text rendering/parsing and conversion to/from `serde_json::Value`.
//!
//! Text form: `null`, bools as `1`/`0`, doubles always with a decimal point
//! or exponent, arrays as `[a, b]`, objects as `{"k":v, "k2":v2}`. Parsing
//! goes through `serde_json`; objects come back as unordered maps and bools
//! rendered as `1`/`0` come back as integers.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;

use super::{Dynamic, Object};

impl Dynamic {
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        match self {
            Dynamic::Null => out.push_str("null"),
            Dynamic::Bool(b) => out.push(if *b { '1' } else { '0' }),
            Dynamic::Int(i) => out.push_str(&i.to_string()),
            Dynamic::Double(d) => {
                if d.is_finite() {
                    out.push_str(&format!("{d:?}"));
                } else {
                    out.push_str("null");
                }
            }
            Dynamic::String(s) => write_json_str(s, out),
            Dynamic::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_json(out);
                }
                out.push(']');
            }
            Dynamic::Object(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_json_str(k, out);
                    out.push(':');
                    v.write_json(out);
                }
                out.push('}');
            }
            Dynamic::Ordered(map) => {
                out.push('{');
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_json(out);
                    out.push(':');
                    v.write_json(out);
                }
                out.push('}');
            }
            Dynamic::Paired(view) => match view.pairs() {
                Ok(pairs) => {
                    out.push('{');
                    for (i, (k, v)) in pairs.enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        write_json_str(k, out);
                        out.push(':');
                        v.write_json(out);
                    }
                    out.push('}');
                }
                // Without usable column names only the values can be shown.
                Err(_) => Dynamic::Array(view.values().to_vec()).write_json(out),
            },
        }
    }

    /// Parse JSON text.
    pub fn from_json(text: &str) -> Result<Dynamic> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Dynamic::from(value))
    }

    /// Convert to a generic `serde_json::Value` tree.
    ///
    /// Null becomes an empty object. Sorted-map keys become their JSON text,
    /// with quotes dropped for string keys.
    pub fn to_tree(&self) -> Value {
        match self {
            Dynamic::Null => Value::Object(serde_json::Map::new()),
            other => other.to_tree_value(),
        }
    }

    fn to_tree_value(&self) -> Value {
        match self {
            Dynamic::Null => Value::Null,
            Dynamic::Bool(b) => Value::Bool(*b),
            Dynamic::Int(i) => Value::from(*i),
            Dynamic::Double(d) => serde_json::Number::from_f64(*d)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Dynamic::String(s) => Value::String(s.clone()),
            Dynamic::Array(items) => Value::Array(items.iter().map(|d| d.to_tree()).collect()),
            Dynamic::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_tree()))
                    .collect(),
            ),
            Dynamic::Ordered(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (tree_key(k), v.to_tree()))
                    .collect(),
            ),
            Dynamic::Paired(view) => match view.pairs() {
                Ok(pairs) => Value::Object(
                    pairs
                        .map(|(k, v)| (k.to_string(), v.to_tree()))
                        .collect(),
                ),
                Err(_) => Value::Array(view.values().iter().map(|d| d.to_tree()).collect()),
            },
        }
    }
}

fn tree_key(key: &Dynamic) -> String {
    match key {
        Dynamic::String(s) => s.clone(),
        other => other.to_json(),
    }
}

fn write_json_str(s: &str, out: &mut String) {
    out.push_str(&Value::from(s).to_string());
}

impl From<Value> for Dynamic {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Dynamic::Null,
            Value::Bool(b) => Dynamic::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Dynamic::Int(i),
                None => Dynamic::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Dynamic::String(s),
            Value::Array(items) => Dynamic::Array(items.into_iter().map(Dynamic::from).collect()),
            Value::Object(map) => Dynamic::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Dynamic::from(v)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl fmt::Display for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Dynamic::Null => serializer.serialize_unit(),
            Dynamic::Bool(b) => serializer.serialize_bool(*b),
            Dynamic::Int(i) => serializer.serialize_i64(*i),
            Dynamic::Double(d) => serializer.serialize_f64(*d),
            Dynamic::String(s) => serializer.serialize_str(s),
            Dynamic::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Dynamic::Object(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
            Dynamic::Ordered(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    m.serialize_entry(&tree_key(k), v)?;
                }
                m.end()
            }
            Dynamic::Paired(view) => match view.pairs() {
                Ok(pairs) => {
                    let mut m = serializer.serialize_map(Some(view.values().len()))?;
                    for (k, v) in pairs {
                        m.serialize_entry(k, v)?;
                    }
                    m.end()
                }
                Err(e) => Err(serde::ser::Error::custom(e)),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Dynamic::from)
    }
}
