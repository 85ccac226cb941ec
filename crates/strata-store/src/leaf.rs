//! Leaf iterator over a [`KvCursor`].

use futures::future::BoxFuture;
use tracing::{debug, warn};

use strata_core::dynamic::Dynamic;
use strata_core::error::{Error, Result};
use strata_core::item::{Id, Record, ID_KEY, TIME_KEY, UNINITIALIZED_ID};
use strata_iter::traits::{IterState, IteratorKind, RecordIterator};

use crate::codec::decode_id;
use crate::cursor::KvCursor;

/// How stored values are turned into payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// UTF-8 (lossy) string.
    #[default]
    Raw,
    /// JSON text. `"time"` and, for keys that are not ids, `"id"` fields are
    /// cached on the record.
    Json,
}

/// Walks a cursor from its first entry.
///
/// `prepare()` seeks to the first entry and the first `next()` consumes it
/// without stepping. `key()` holds the stored key (an `Int` for id keys, a
/// string otherwise) and `value()` the decoded value.
pub struct StoreIterator<C> {
    cursor: C,
    state: IterState,
    format: ValueFormat,
    started: bool,
    key: Option<Record>,
    value: Option<Record>,
}

impl<C: KvCursor> StoreIterator<C> {
    pub fn new(cursor: C) -> Self {
        Self::with_format(cursor, ValueFormat::Raw)
    }

    pub fn with_format(cursor: C, format: ValueFormat) -> Self {
        Self {
            cursor,
            state: IterState::new(),
            format,
            started: false,
            key: None,
            value: None,
        }
    }

    pub fn format(&self) -> ValueFormat {
        self.format
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<Dynamic> {
        match self.format {
            ValueFormat::Raw => Ok(Dynamic::String(String::from_utf8_lossy(bytes).into_owned())),
            ValueFormat::Json => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|e| Error::MalformedValue(format!("stored value is not UTF-8: {e}")))?;
                Dynamic::from_json(text)
            }
        }
    }

    fn load(&mut self) -> Result<()> {
        let key_bytes = self.cursor.key();
        let id = decode_id(key_bytes);
        let key_payload = match id {
            Some(id) => Dynamic::Int(id as i64),
            None => Dynamic::String(String::from_utf8_lossy(key_bytes).into_owned()),
        };

        let mut value = Record::new(
            id.unwrap_or(UNINITIALIZED_ID),
            0,
            self.decode_value(self.cursor.value())?,
        );
        if let Ok(ts) = value.value().at(TIME_KEY).and_then(Dynamic::get_i64) {
            value.set_ts(ts);
        }
        if id.is_none() {
            if let Ok(stored) = value.value().at(ID_KEY).and_then(Dynamic::get_i64) {
                value.set_id(stored as Id);
            }
        }

        self.key = Some(Record::new(value.id(), value.ts(), key_payload));
        self.value = Some(value);
        Ok(())
    }

    fn status(&self) -> Result<()> {
        self.cursor.status().map_err(|e| match e {
            Error::Storage(msg) => Error::Storage(msg),
            other => Error::Storage(other.to_string()),
        })
    }
}

impl<C: KvCursor> RecordIterator for StoreIterator<C> {
    fn name(&self) -> &'static str {
        "store"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Store
    }

    fn state(&self) -> &IterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut IterState {
        &mut self.state
    }

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.state.is_prepared() {
                return Ok(());
            }
            self.cursor.seek_to_first();
            self.state.mark_prepared();
            self.status()
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.state.is_done() {
            return Ok(false);
        }
        if self.started {
            self.cursor.next();
        } else {
            self.started = true;
        }
        if let Err(e) = self.status() {
            warn!(error = %e, "store cursor failed");
            self.state.set_done();
            return Err(e);
        }
        if !self.cursor.valid() {
            debug!("store cursor exhausted");
            self.key = None;
            self.value = None;
            self.state.set_done();
            return Ok(false);
        }
        self.load()?;
        Ok(true)
    }

    fn current(&self) -> &Record {
        self.value.as_ref().unwrap_or_else(|| Record::empty_ref())
    }

    fn key(&self) -> &Record {
        self.key.as_ref().unwrap_or_else(|| Record::empty_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_id;
    use crate::memory::MemoryStore;
    use futures::executor::block_on;
    use strata_iter::transform::LimitIterator;

    fn text(rec: &Record) -> &str {
        rec.value().as_str().unwrap()
    }

    #[test]
    fn walks_keys_highest_first() {
        let store = MemoryStore::new();
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3")] {
            store.put(k, v).unwrap();
        }
        let mut it = StoreIterator::new(store.cursor().unwrap());
        block_on(it.prepare()).unwrap();

        let mut seen = Vec::new();
        while it.next().unwrap() {
            seen.push((text(it.key()).to_string(), text(it.value().unwrap()).to_string()));
        }
        assert_eq!(
            seen,
            vec![
                ("c".to_string(), "3".to_string()),
                ("b".to_string(), "2".to_string()),
                ("a".to_string(), "1".to_string()),
            ]
        );
        assert!(it.done());
    }

    #[test]
    fn composes_with_limit() {
        let store = MemoryStore::new();
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3"), ("d", "4"), ("e", "5")] {
            store.put(k, v).unwrap();
        }
        let leaf = Box::new(StoreIterator::new(store.cursor().unwrap()));
        let mut it = LimitIterator::with_offset(leaf, 2, 1);
        block_on(it.prepare()).unwrap();

        assert!(it.next().unwrap());
        assert_eq!((text(it.key()), text(it.value().unwrap())), ("d", "4"));
        assert!(it.next().unwrap());
        assert_eq!((text(it.key()), text(it.value().unwrap())), ("c", "3"));
        assert!(!it.next().unwrap());
    }

    #[test]
    fn id_keys_and_json_values() {
        let store = MemoryStore::new();
        for id in [3u64, 10, 7] {
            let value = format!(r#"{{"n": {id}, "time": {}}}"#, id * 100);
            store.put(encode_id(id).to_vec(), value).unwrap();
        }
        let mut it = StoreIterator::with_format(store.cursor().unwrap(), ValueFormat::Json);
        block_on(it.prepare()).unwrap();

        assert!(it.skip_to(8).unwrap());
        assert_eq!(it.id(), 7);
        assert_eq!(it.key().value(), &Dynamic::Int(7));
        let v = it.value().unwrap();
        assert_eq!(v.ts(), 700);
        assert_eq!(v.value().at("n").unwrap(), &Dynamic::Int(7));
        assert!(it.next().unwrap());
        assert_eq!(it.id(), 3);
        assert!(!it.next().unwrap());
    }

    #[test]
    fn bad_json_is_an_error() {
        let store = MemoryStore::new();
        store.put(encode_id(1).to_vec(), "{not json").unwrap();
        let mut it = StoreIterator::with_format(store.cursor().unwrap(), ValueFormat::Json);
        block_on(it.prepare()).unwrap();
        assert!(matches!(it.next(), Err(Error::MalformedValue(_))));
    }

    #[test]
    fn empty_store() {
        let store = MemoryStore::new();
        let mut it = StoreIterator::new(store.cursor().unwrap());
        assert!(it.next().is_err());
        block_on(it.prepare()).unwrap();
        assert!(!it.next().unwrap());
        assert_eq!(it.key(), Record::empty_ref());
    }

    struct FailingCursor;

    impl KvCursor for FailingCursor {
        fn seek_to_first(&mut self) {}

        fn valid(&self) -> bool {
            false
        }

        fn next(&mut self) {}

        fn key(&self) -> &[u8] {
            &[]
        }

        fn value(&self) -> &[u8] {
            &[]
        }

        fn status(&self) -> Result<()> {
            Err(Error::Storage("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn cursor_errors_surface_as_storage() {
        let mut it = StoreIterator::new(FailingCursor);
        let err = it.prepare().await.unwrap_err();
        assert_eq!(err, Error::Storage("disk on fire".into()));
        assert!(it.prepared());
        assert!(matches!(it.next(), Err(Error::Storage(_))));
        assert!(it.done());
    }
}
