use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::Record;

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, Phase, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Buffers its child and emits the records last to first.
pub struct ReverseIterator {
    base: WrappedIterator,
    phase: Phase,
    buffer: Vec<Record>,
    current: Option<Record>,
}

impl ReverseIterator {
    pub fn new(inner: BoxedIterator) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            phase: Phase::NotStarted,
            buffer: Vec::new(),
            current: None,
        }
    }

    fn load(&mut self) -> Result<()> {
        let inner = self.base.inner_mut()?;
        while inner.next()? {
            self.buffer.push(inner.current().clone());
        }
        Ok(())
    }
}

impl RecordIterator for ReverseIterator {
    fn name(&self) -> &'static str {
        "reverse"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if self.phase == Phase::NotStarted {
            self.phase = Phase::Active;
            self.load()?;
        }
        self.current = self.buffer.pop();
        if self.current.is_none() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn current(&self) -> &Record {
        self.current.as_ref().unwrap_or_else(|| Record::empty_ref())
    }

    fn num_buffered(&self) -> Option<usize> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::Active => Some(self.buffer.len()),
        }
    }

    fn child_count(&self) -> usize {
        1
    }
}
