//! Order-preserving map keyed by `Dynamic`.
//!
//! Backed by a vector kept sorted by key. Key comparison can fail (mixed key
//! kinds, unordered map keys), so every keyed operation returns a `Result`.

use std::cmp::Ordering;

use crate::error::Result;

use super::Dynamic;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedMap {
    entries: Vec<(Dynamic, Dynamic)>,
}

impl SortedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs; later duplicates overwrite earlier ones.
    pub fn from_entries<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Dynamic, Dynamic)>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v)?;
        }
        Ok(map)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Dynamic, &Dynamic)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Dynamic> {
        self.entries.iter().map(|(k, _)| k)
    }

    fn search(&self, key: &Dynamic) -> Result<std::result::Result<usize, usize>> {
        let (mut lo, mut hi) = (0usize, self.entries.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.entries[mid].0.try_cmp(key)? {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        Ok(Err(lo))
    }

    // String keys against string keys never fail to compare.
    fn search_str(&self, key: &str) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| match k {
            Dynamic::String(s) => s.as_str().cmp(key),
            Dynamic::Null | Dynamic::Bool(_) | Dynamic::Int(_) | Dynamic::Double(_) => {
                Ordering::Less
            }
            _ => Ordering::Greater,
        })
    }

    pub fn get(&self, key: &Dynamic) -> Result<Option<&Dynamic>> {
        if let Dynamic::String(s) = key {
            return self.get_str(s);
        }
        Ok(self.search(key)?.ok().map(|i| &self.entries[i].1))
    }

    pub fn get_str(&self, key: &str) -> Result<Option<&Dynamic>> {
        if self.all_string_keys() {
            return Ok(self.search_str(key).ok().map(|i| &self.entries[i].1));
        }
        Ok(self
            .search(&Dynamic::String(key.to_string()))?
            .ok()
            .map(|i| &self.entries[i].1))
    }

    pub fn get_mut(&mut self, key: &Dynamic) -> Result<Option<&mut Dynamic>> {
        Ok(match self.search(key)? {
            Ok(i) => Some(&mut self.entries[i].1),
            Err(_) => None,
        })
    }

    pub fn contains_key(&self, key: &Dynamic) -> Result<bool> {
        Ok(self.search(key)?.is_ok())
    }

    /// Insert, returning the previous value for `key`.
    pub fn insert(&mut self, key: Dynamic, value: Dynamic) -> Result<Option<Dynamic>> {
        Ok(match self.search(&key)? {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            Err(i) => {
                self.entries.insert(i, (key, value));
                None
            }
        })
    }

    /// Infallible insert for string keys into a string keyed map.
    ///
    /// Falls back to appending in key order among string keys if other key
    /// kinds are present.
    pub fn insert_str(&mut self, key: &str, value: Dynamic) {
        match self.search_str(key) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (Dynamic::String(key.to_string()), value)),
        }
    }

    pub fn entry_or_default(&mut self, key: Dynamic) -> Result<&mut Dynamic> {
        let idx = match self.search(&key)? {
            Ok(i) => i,
            Err(i) => {
                self.entries.insert(i, (key, Dynamic::Null));
                i
            }
        };
        Ok(&mut self.entries[idx].1)
    }

    pub fn remove(&mut self, key: &Dynamic) -> Result<Option<Dynamic>> {
        Ok(match self.search(key)? {
            Ok(i) => Some(self.entries.remove(i).1),
            Err(_) => None,
        })
    }

    fn all_string_keys(&self) -> bool {
        self.entries.iter().all(|(k, _)| k.is_string())
    }

    /// Lexicographic `<` over `(key, value)` pairs, then by size.
    pub(crate) fn try_less(&self, other: &SortedMap) -> Result<bool> {
        for ((ka, va), (kb, vb)) in self.entries.iter().zip(other.entries.iter()) {
            if ka.try_less(kb)? {
                return Ok(true);
            }
            if kb.try_less(ka)? {
                return Ok(false);
            }
            if va.try_less(vb)? {
                return Ok(true);
            }
            if vb.try_less(va)? {
                return Ok(false);
            }
        }
        Ok(self.entries.len() < other.entries.len())
    }

    pub(crate) fn total_cmp(&self, other: &SortedMap) -> Ordering {
        super::compare::lexicographic(&self.entries, &other.entries, |(ka, va), (kb, vb)| {
            ka.total_cmp(kb).then_with(|| va.total_cmp(vb))
        })
    }
}

impl IntoIterator for SortedMap {
    type Item = (Dynamic, Dynamic);
    type IntoIter = std::vec::IntoIter<(Dynamic, Dynamic)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
