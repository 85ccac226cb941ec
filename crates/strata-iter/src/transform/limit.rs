use futures::future::BoxFuture;
use tracing::debug;

use strata_core::error::Result;
use strata_core::item::Record;

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Emits at most `count` records of its child after dropping the first
/// `offset`.
pub struct LimitIterator {
    base: WrappedIterator,
    remaining: usize,
    offset: usize,
}

impl LimitIterator {
    pub fn new(inner: BoxedIterator, count: usize) -> Self {
        Self::with_offset(inner, count, 0)
    }

    pub fn with_offset(inner: BoxedIterator, count: usize, offset: usize) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            remaining: count,
            offset,
        }
    }

    /// Records still allowed through.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl RecordIterator for LimitIterator {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.remaining == 0 || self.done() {
            debug!(remaining = self.remaining, "limit reached");
            self.base.state_mut().set_done();
            return Ok(false);
        }
        let advanced = if self.offset > 0 {
            let n = std::mem::take(&mut self.offset) + 1;
            let inner = self.base.inner_mut()?;
            let skipped = inner.skip(n)?;
            if !skipped {
                self.base.state_mut().set_done();
            }
            skipped
        } else {
            self.base.advance_inner()?
        };
        if advanced {
            self.remaining -= 1;
        }
        Ok(advanced)
    }

    fn current(&self) -> &Record {
        if self.done() {
            return Record::empty_ref();
        }
        self.base.inner_current()
    }

    fn key(&self) -> &Record {
        if self.done() {
            return Record::empty_ref();
        }
        self.base.inner_key()
    }

    fn cookie(&self) -> String {
        self.base.cookie()
    }

    fn order_preserving(&self) -> bool {
        true
    }

    fn child_count(&self) -> usize {
        1
    }
}
