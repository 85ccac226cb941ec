//! In-memory sorted store.
//!
//! Backs tests and small embedded datasets. Cursors iterate in reverse
//! bytewise key order over a snapshot taken when the cursor is created.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use strata_core::error::{Error, Result};

use crate::cursor::KvCursor;

type Entries = BTreeMap<Vec<u8>, Vec<u8>>;

fn poisoned() -> Error {
    Error::Storage("memory store lock poisoned".into())
}

/// Thread-safe in-memory key/value store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Entries>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<()> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        data.insert(key.into(), value.into());
        Ok(())
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.get(key).cloned())
    }

    /// Returns whether the key was present.
    pub fn delete(&self, key: &[u8]) -> Result<bool> {
        let mut data = self.data.write().map_err(|_| poisoned())?;
        Ok(data.remove(key).is_some())
    }

    pub fn len(&self) -> Result<usize> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Cursor over a snapshot of the current contents.
    pub fn cursor(&self) -> Result<MemoryCursor> {
        let data = self.data.read().map_err(|_| poisoned())?;
        let entries = data
            .iter()
            .rev()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(MemoryCursor { entries, pos: None })
    }
}

/// Snapshot cursor returned by [`MemoryStore::cursor`]. Invalid until
/// `seek_to_first()`.
pub struct MemoryCursor {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    pos: Option<usize>,
}

impl MemoryCursor {
    fn entry(&self) -> Option<&(Vec<u8>, Vec<u8>)> {
        self.pos.and_then(|p| self.entries.get(p))
    }
}

impl KvCursor for MemoryCursor {
    fn seek_to_first(&mut self) {
        self.pos = Some(0);
    }

    fn valid(&self) -> bool {
        self.entry().is_some()
    }

    fn next(&mut self) {
        if let Some(p) = self.pos.as_mut() {
            *p += 1;
        }
    }

    fn key(&self) -> &[u8] {
        self.entry().map(|(k, _)| k.as_slice()).unwrap_or_default()
    }

    fn value(&self) -> &[u8] {
        self.entry().map(|(_, v)| v.as_slice()).unwrap_or_default()
    }

    fn status(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::new();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.len().unwrap(), 2);

        assert!(store.delete(b"a").unwrap());
        assert!(!store.delete(b"a").unwrap());
        assert_eq!(store.get(b"a").unwrap(), None);
        assert!(!store.is_empty().unwrap());
    }

    #[test]
    fn cursor_runs_in_reverse_key_order() {
        let store = MemoryStore::new();
        for k in ["a", "c", "b"] {
            store.put(k, k.to_uppercase()).unwrap();
        }
        let mut cur = store.cursor().unwrap();
        assert!(!cur.valid());
        cur.seek_to_first();

        let mut seen = Vec::new();
        while cur.valid() {
            seen.push((cur.key().to_vec(), cur.value().to_vec()));
            cur.next();
        }
        assert_eq!(
            seen,
            vec![
                (b"c".to_vec(), b"C".to_vec()),
                (b"b".to_vec(), b"B".to_vec()),
                (b"a".to_vec(), b"A".to_vec()),
            ]
        );
        assert!(cur.key().is_empty());
    }

    #[test]
    fn cursor_is_a_snapshot() {
        let store = MemoryStore::new();
        store.put("a", "1").unwrap();
        let mut cur = store.cursor().unwrap();
        store.put("b", "2").unwrap();

        cur.seek_to_first();
        assert_eq!(cur.key(), b"a");
        cur.next();
        assert!(!cur.valid());
    }
}
