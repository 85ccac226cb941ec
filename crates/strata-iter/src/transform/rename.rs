use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::{Id, Record, ID_KEY, TIME_KEY};

use super::map::{MapIterator, RecordMap};
use crate::traits::BoxedIterator;

/// Renames one payload attribute. The result is a sorted map.
///
/// After the rename the cached id and timestamp are refreshed from the
/// payload's `"id"` and `"time"` fields, each one only when present as an
/// integer. Payloads without them keep the child's cached values.
pub struct Rename {
    new_key: String,
    old_key: String,
}

impl Rename {
    pub fn new_key(&self) -> &str {
        &self.new_key
    }

    pub fn old_key(&self) -> &str {
        &self.old_key
    }
}

impl RecordMap for Rename {
    const NAME: &'static str = "let";

    fn apply(&self, rec: &Record) -> Result<Record> {
        let renamed = rec.value().rename(&self.old_key, &self.new_key)?;
        let mut out = Record::new(rec.id(), rec.ts(), Dynamic::Ordered(renamed));
        if let Ok(id) = out.value().at(ID_KEY).and_then(Dynamic::get_i64) {
            out.set_id(id as Id);
        }
        if let Ok(ts) = out.value().at(TIME_KEY).and_then(Dynamic::get_i64) {
            out.set_ts(ts);
        }
        Ok(out)
    }
}

/// `let new_key = old_key` over every record of the child.
pub type LetIterator = MapIterator<Rename>;

impl MapIterator<Rename> {
    pub fn new(inner: BoxedIterator, new_key: impl Into<String>, old_key: impl Into<String>) -> Self {
        Self::with_map(
            inner,
            Rename {
                new_key: new_key.into(),
                old_key: old_key.into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::VecIterator;
    use crate::traits::RecordIterator;
    use futures::executor::block_on;

    fn drain(it: &mut dyn RecordIterator) -> Vec<Record> {
        let mut out = Vec::new();
        while it.next().unwrap() {
            out.push(it.value().unwrap().clone());
        }
        out
    }

    #[test]
    fn renames_one_key() {
        let leaf = VecIterator::from_values([
            (2, Dynamic::object_from([("a", 2i64), ("b", 11)])),
            (1, Dynamic::object_from([("a", 1i64), ("b", 10)])),
        ]);
        let mut l = LetIterator::new(Box::new(leaf), "c", "a");
        block_on(l.prepare()).unwrap();
        assert_eq!(
            drain(&mut l),
            vec![
                Record::new(2, 0, Dynamic::ordered_from([("c", 2i64), ("b", 11)])),
                Record::new(1, 0, Dynamic::ordered_from([("c", 1i64), ("b", 10)])),
            ]
        );
    }

    #[test]
    fn renaming_onto_time_updates_timestamp() {
        let leaf = VecIterator::from_values([(3, Dynamic::object_from([("created", 1700i64)]))]);
        let mut l = LetIterator::new(Box::new(leaf), "time", "created");
        block_on(l.prepare()).unwrap();
        assert!(l.next().unwrap());
        let v = l.value().unwrap();
        assert_eq!(v.ts(), 1700);
        assert_eq!(v.id(), 3);
    }

    #[test]
    fn payload_id_and_time_are_resynced_on_any_rename() {
        let leaf = VecIterator::from_values([(
            3,
            Dynamic::object_from([("id", 40i64), ("time", 55), ("a", 1)]),
        )]);
        let mut l = LetIterator::new(Box::new(leaf), "b", "a");
        block_on(l.prepare()).unwrap();
        assert!(l.next().unwrap());
        let v = l.value().unwrap();
        assert_eq!((v.id(), v.ts()), (40, 55));
        assert_eq!(v.value().at("b").unwrap(), &Dynamic::Int(1));
    }

    #[test]
    fn scalar_payload_fails() {
        let leaf = VecIterator::from_values([(3, Dynamic::Int(1))]);
        let mut l = LetIterator::new(Box::new(leaf), "b", "a");
        block_on(l.prepare()).unwrap();
        assert!(l.next().is_err());
    }
}
