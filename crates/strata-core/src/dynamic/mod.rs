//! The `Dynamic` value model.
//!
//! A closed sum over scalars, strings, vectors and three map shapes. Every
//! operation is a `match` over the kind; combinations a kind does not support
//! fail with [`Error::TypeMismatch`] instead of panicking.
//!
//! Map shapes:
//! - `Object`: unordered, string keyed. Cannot be ordered against anything.
//! - `Ordered`: a [`SortedMap`] keyed by `Dynamic`, kept in ascending key order.
//! - `Paired`: a [`PairedView`], shared column names plus a parallel value
//!   vector. Read-only with respect to keys.

mod compare;
mod json;
mod ops;
mod paired;
mod sorted_map;

pub use paired::PairedView;
pub use sorted_map::SortedMap;

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

pub type Object = HashMap<String, Dynamic>;

static NULL_DYNAMIC: Lazy<Dynamic> = Lazy::new(|| Dynamic::Null);

#[derive(Debug, Clone, Default)]
pub enum Dynamic {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<Dynamic>),
    Object(Object),
    Ordered(SortedMap),
    Paired(PairedView),
}

/// Kind tag of a [`Dynamic`], used for error messages and `is_kind` checks.
///
/// Declaration order is the rank used by [`Dynamic::total_cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Double,
    String,
    Array,
    Object,
    Ordered,
    Paired,
}

impl Kind {
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Int => "int64",
            Kind::Double => "double",
            Kind::String => "string",
            Kind::Array => "vector",
            Kind::Object => "unordered_map",
            Kind::Ordered => "ordered_map",
            Kind::Paired => "paired_view",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Dynamic {
    /// Shared null sentinel returned by non-failing lookups.
    pub fn null_ref() -> &'static Dynamic {
        &NULL_DYNAMIC
    }

    pub fn object() -> Self {
        Dynamic::Object(Object::new())
    }

    pub fn ordered() -> Self {
        Dynamic::Ordered(SortedMap::new())
    }

    /// Build an unordered map from string keyed pairs.
    pub fn object_from<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Dynamic>,
        I: IntoIterator<Item = (K, V)>,
    {
        Dynamic::Object(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sorted map from string keyed pairs. String keys always compare.
    pub fn ordered_from<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Dynamic>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = SortedMap::new();
        for (k, v) in pairs {
            map.insert_str(&k.into(), v.into());
        }
        Dynamic::Ordered(map)
    }

    pub fn kind(&self) -> Kind {
        match self {
            Dynamic::Null => Kind::Null,
            Dynamic::Bool(_) => Kind::Bool,
            Dynamic::Int(_) => Kind::Int,
            Dynamic::Double(_) => Kind::Double,
            Dynamic::String(_) => Kind::String,
            Dynamic::Array(_) => Kind::Array,
            Dynamic::Object(_) => Kind::Object,
            Dynamic::Ordered(_) => Kind::Ordered,
            Dynamic::Paired(_) => Kind::Paired,
        }
    }

    pub fn is_kind(&self, kind: Kind) -> bool {
        self.kind() == kind
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Dynamic::Null)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Dynamic::String(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Dynamic::Int(_))
    }

    /// Any of the three map shapes.
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            Dynamic::Object(_) | Dynamic::Ordered(_) | Dynamic::Paired(_)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Dynamic::Array(_))
    }

    pub fn is_iterable(&self) -> bool {
        self.is_object() || self.is_array()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Dynamic::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Dynamic::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Dynamic]> {
        match self {
            Dynamic::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Dynamic::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sorted_map(&self) -> Option<&SortedMap> {
        match self {
            Dynamic::Ordered(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_paired(&self) -> Option<&PairedView> {
        match self {
            Dynamic::Paired(p) => Some(p),
            _ => None,
        }
    }

    fn expect_kind(&self, kind: Kind) -> Error {
        Error::TypeMismatch(format!("expected {}, found {}", kind, self.kind()))
    }

    pub fn get_bool(&self) -> Result<bool> {
        self.as_bool().ok_or_else(|| self.expect_kind(Kind::Bool))
    }

    pub fn get_i64(&self) -> Result<i64> {
        self.as_i64().ok_or_else(|| self.expect_kind(Kind::Int))
    }

    pub fn get_f64(&self) -> Result<f64> {
        self.as_f64().ok_or_else(|| self.expect_kind(Kind::Double))
    }

    pub fn get_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.expect_kind(Kind::String))
    }

    pub fn get_array(&self) -> Result<&[Dynamic]> {
        self.as_array().ok_or_else(|| self.expect_kind(Kind::Array))
    }

    /// Null is empty, other scalars never are; containers by element count.
    pub fn is_empty(&self) -> bool {
        match self {
            Dynamic::Null => true,
            Dynamic::Bool(_) | Dynamic::Int(_) | Dynamic::Double(_) => false,
            Dynamic::String(s) => s.is_empty(),
            Dynamic::Array(v) => v.is_empty(),
            Dynamic::Object(m) => m.is_empty(),
            Dynamic::Ordered(m) => m.is_empty(),
            Dynamic::Paired(p) => p.values().is_empty(),
        }
    }

    /// Element count. Scalars have no length.
    pub fn length(&self) -> Result<usize> {
        match self {
            Dynamic::Null | Dynamic::Bool(_) | Dynamic::Int(_) | Dynamic::Double(_) => Err(
                Error::TypeMismatch(format!("length not supported for {}", self.kind())),
            ),
            Dynamic::String(s) => Ok(s.len()),
            Dynamic::Array(v) => Ok(v.len()),
            Dynamic::Object(m) => Ok(m.len()),
            Dynamic::Ordered(m) => Ok(m.len()),
            Dynamic::Paired(p) => Ok(p.values().len()),
        }
    }

    /// Lookup by string key in any map shape.
    pub fn at(&self, key: &str) -> Result<&Dynamic> {
        let found = match self {
            Dynamic::Object(m) => m.get(key),
            Dynamic::Ordered(m) => m.get_str(key)?,
            Dynamic::Paired(p) => p.get(key)?,
            Dynamic::Array(_) => None,
            _ => {
                return Err(Error::Unsupported(format!(
                    "at(\"{key}\") on {}",
                    self.kind()
                )))
            }
        };
        found.ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Lookup by an arbitrary key. Vectors accept integer keys as indices.
    pub fn at_value(&self, key: &Dynamic) -> Result<&Dynamic> {
        match (self, key) {
            (Dynamic::Ordered(m), _) => m
                .get(key)?
                .ok_or_else(|| Error::KeyNotFound(key.to_json())),
            (Dynamic::Array(v), Dynamic::Int(i)) => usize::try_from(*i)
                .ok()
                .and_then(|idx| v.get(idx))
                .ok_or_else(|| Error::KeyNotFound(format!("index {i}"))),
            (_, Dynamic::String(s)) => self.at(s),
            (Dynamic::Object(_), _) | (Dynamic::Paired(_), _) | (Dynamic::Array(_), _) => {
                Err(Error::KeyNotFound(key.to_json()))
            }
            _ => Err(Error::Unsupported(format!("at() on {}", self.kind()))),
        }
    }

    /// Positional access. Non-vectors retry with an integer key.
    pub fn at_index(&self, idx: usize) -> Result<&Dynamic> {
        match self {
            Dynamic::Array(v) => v
                .get(idx)
                .ok_or_else(|| Error::KeyNotFound(format!("index {idx}"))),
            _ => {
                let key = i64::try_from(idx)
                    .map_err(|_| Error::KeyNotFound(format!("index {idx}")))?;
                self.at_value(&Dynamic::Int(key))
            }
        }
    }

    /// Like [`at`](Self::at) but yields the null sentinel on any failure.
    pub fn at_no_throw(&self, key: &str) -> &Dynamic {
        self.at(key).unwrap_or(Dynamic::null_ref())
    }

    /// Mutable lookup that inserts `Null` on a miss. `Null` becomes an
    /// unordered map first. Paired views cannot grow keys.
    pub fn at_with_insert(&mut self, key: impl Into<Dynamic>) -> Result<&mut Dynamic> {
        let key = key.into();
        if self.is_null() {
            *self = Dynamic::object();
        }
        match self {
            Dynamic::Object(m) => match key {
                Dynamic::String(k) => Ok(m.entry(k).or_default()),
                other => Err(Error::TypeMismatch(format!(
                    "unordered map keys must be strings, got {}",
                    other.kind()
                ))),
            },
            Dynamic::Ordered(m) => m.entry_or_default(key),
            Dynamic::Paired(_) => Err(Error::Unsupported(
                "paired view keys are fixed; insertion by key is not possible".into(),
            )),
            other => Err(Error::Unsupported(format!(
                "at_with_insert on {}",
                other.kind()
            ))),
        }
    }

    /// Insert or overwrite `key` in a map shaped value.
    pub fn insert(&mut self, key: impl Into<Dynamic>, value: impl Into<Dynamic>) -> Result<()> {
        *self.at_with_insert(key)? = value.into();
        Ok(())
    }

    /// Re-parse a string payload as `other`'s kind. Other payloads must
    /// already be of that kind.
    ///
    /// Used by filters to learn the comparison type from the first record.
    pub fn cast_to(&mut self, other: &Dynamic) -> Result<()> {
        let text = match self {
            Dynamic::String(s) => std::mem::take(s),
            v if v.kind() == other.kind() => return Ok(()),
            _ => return Err(self.expect_kind(Kind::String)),
        };
        let parsed = match other {
            Dynamic::Int(_) => text.trim().parse::<i64>().map(Dynamic::Int).map_err(|e| {
                Error::MalformedValue(format!("cannot parse {text:?} as int64: {e}"))
            }),
            Dynamic::Double(_) => text.trim().parse::<f64>().map(Dynamic::Double).map_err(|e| {
                Error::MalformedValue(format!("cannot parse {text:?} as double: {e}"))
            }),
            Dynamic::String(_) => Ok(Dynamic::String(text.clone())),
            _ => Err(Error::Unsupported(format!("can't convert to {}", other.kind()))),
        };
        match parsed {
            Ok(v) => {
                *self = v;
                Ok(())
            }
            Err(e) => {
                *self = Dynamic::String(text);
                Err(e)
            }
        }
    }

    /// Plain text form: raw strings, integer digits, `1`/`0` for bools,
    /// `""` for empty values and JSON for everything else.
    pub fn to_string_lossy(&self) -> String {
        match self {
            Dynamic::String(s) => s.clone(),
            Dynamic::Int(i) => i.to_string(),
            Dynamic::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            v if v.is_empty() => String::new(),
            v => v.to_json(),
        }
    }

    /// Iterate `(key, value)` pairs. Vectors yield integer index keys.
    pub fn entries(&self) -> Result<Vec<(Dynamic, &Dynamic)>> {
        match self {
            Dynamic::Array(v) => Ok(v
                .iter()
                .enumerate()
                .map(|(i, d)| (Dynamic::Int(i as i64), d))
                .collect()),
            Dynamic::Object(m) => Ok(m
                .iter()
                .map(|(k, v)| (Dynamic::String(k.clone()), v))
                .collect()),
            Dynamic::Ordered(m) => Ok(m.iter().map(|(k, v)| (k.clone(), v)).collect()),
            Dynamic::Paired(p) => Ok(p
                .pairs()?
                .map(|(k, v)| (Dynamic::String(k.to_string()), v))
                .collect()),
            other => Err(Error::TypeMismatch(format!(
                "Iteration not supported for {}",
                other.kind()
            ))),
        }
    }

    /// Sorted map of the named columns that are present.
    pub fn project(&self, columns: &[String]) -> SortedMap {
        let mut out = SortedMap::new();
        for col in columns {
            if let Ok(v) = self.at(col) {
                out.insert_str(col, v.clone());
            }
        }
        out
    }

    /// Sorted map copy with `old_key` renamed to `new_key`.
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<SortedMap> {
        let mut out = SortedMap::new();
        for (k, v) in self.entries()? {
            match k {
                Dynamic::String(ref s) if s == old_key => {
                    out.insert_str(new_key, v.clone());
                }
                other => {
                    out.insert(other, v.clone())?;
                }
            }
        }
        Ok(out)
    }
}

impl From<bool> for Dynamic {
    fn from(v: bool) -> Self {
        Dynamic::Bool(v)
    }
}

impl From<i64> for Dynamic {
    fn from(v: i64) -> Self {
        Dynamic::Int(v)
    }
}

impl From<i32> for Dynamic {
    fn from(v: i32) -> Self {
        Dynamic::Int(i64::from(v))
    }
}

impl From<f64> for Dynamic {
    fn from(v: f64) -> Self {
        Dynamic::Double(v)
    }
}

impl From<&str> for Dynamic {
    fn from(v: &str) -> Self {
        Dynamic::String(v.to_string())
    }
}

impl From<String> for Dynamic {
    fn from(v: String) -> Self {
        Dynamic::String(v)
    }
}

impl From<Vec<Dynamic>> for Dynamic {
    fn from(v: Vec<Dynamic>) -> Self {
        Dynamic::Array(v)
    }
}

impl From<Object> for Dynamic {
    fn from(v: Object) -> Self {
        Dynamic::Object(v)
    }
}

impl From<SortedMap> for Dynamic {
    fn from(v: SortedMap) -> Self {
        Dynamic::Ordered(v)
    }
}

impl From<PairedView> for Dynamic {
    fn from(v: PairedView) -> Self {
        Dynamic::Paired(v)
    }
}
