use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::Record;

use super::map::{MapIterator, RecordMap};
use crate::traits::BoxedIterator;

/// Wraps the whole payload under a single key: `{ key: payload }`.
pub struct Nesting {
    key: String,
}

impl RecordMap for Nesting {
    const NAME: &'static str = "nest";

    fn apply(&self, rec: &Record) -> Result<Record> {
        let nested = Dynamic::ordered_from([(self.key.as_str(), rec.value().clone())]);
        Ok(Record::new(rec.id(), rec.ts(), nested))
    }
}

pub type NestIterator = MapIterator<Nesting>;

impl MapIterator<Nesting> {
    pub fn new(inner: BoxedIterator, key: impl Into<String>) -> Self {
        Self::with_map(inner, Nesting { key: key.into() })
    }
}
