use futures::future::BoxFuture;
use once_cell::sync::Lazy;

use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::{Record, UNINITIALIZED_ID};

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};
use crate::wrapped::WrappedIterator;

pub const COUNT_KEY: &str = "count";

static COUNT_KEY_RECORD: Lazy<Record> =
    Lazy::new(|| Record::new(UNINITIALIZED_ID, 0, Dynamic::from(COUNT_KEY)));

/// Drains its child on the first pull and emits a single `{"count": n}`
/// record.
pub struct CountIterator {
    base: WrappedIterator,
    value: Option<Record>,
}

impl CountIterator {
    pub fn new(inner: BoxedIterator) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            value: None,
        }
    }

    /// The count once emitted.
    pub fn count(&self) -> Option<i64> {
        self.value
            .as_ref()
            .and_then(|v| v.value().at(COUNT_KEY).ok())
            .and_then(Dynamic::as_i64)
    }
}

impl RecordIterator for CountIterator {
    fn name(&self) -> &'static str {
        "count"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() || self.value.is_some() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        let mut n = 0i64;
        if let Ok(inner) = self.base.inner_mut() {
            while inner.next()? {
                n += 1;
            }
        }
        self.value = Some(Record::new(
            UNINITIALIZED_ID,
            0,
            Dynamic::object_from([(COUNT_KEY, n)]),
        ));
        Ok(true)
    }

    fn current(&self) -> &Record {
        match &self.value {
            Some(v) if !self.done() => v,
            _ => Record::empty_ref(),
        }
    }

    fn key(&self) -> &Record {
        &COUNT_KEY_RECORD
    }

    fn child_count(&self) -> usize {
        1
    }
}
