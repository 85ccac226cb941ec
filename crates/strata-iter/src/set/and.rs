use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::composite::CompositeIterator;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};

/// Intersection of id streams: emits an id only when every child is on it.
///
/// The last child drives; the others leapfrog after it with `skip_to`.
pub struct AndIterator {
    base: CompositeIterator,
}

impl AndIterator {
    pub fn new(children: Vec<BoxedIterator>) -> Self {
        Self {
            base: CompositeIterator::new(children),
        }
    }

    pub fn from_slots(children: Vec<Option<BoxedIterator>>) -> Self {
        Self {
            base: CompositeIterator::from_slots(children),
        }
    }

    fn last_idx(&self) -> Option<usize> {
        self.base.len().checked_sub(1)
    }

    /// Skip every child in turn to the id of the previous one until a full
    /// chain agrees.
    fn advance_to_last(&mut self) -> Result<bool> {
        let Some(mut pivot) = self.last_idx() else {
            self.base.state_mut().set_done();
            return Ok(false);
        };
        let n = self.base.len();
        let mut i = 0;
        loop {
            let target = self.base.child(pivot)?.id();
            let child = self.base.child_mut(i)?;
            if child.id() <= target {
                return Ok(true);
            }
            if !child.skip_to(target)? {
                self.base.state_mut().set_done();
                return Ok(false);
            }
            pivot = i;
            i = (i + 1) % n;
        }
    }

    fn last(&self) -> Option<&BoxedIterator> {
        self.base.slots().last().and_then(Option::as_ref)
    }
}

impl RecordIterator for AndIterator {
    fn name(&self) -> &'static str {
        "and"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Composite
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let name = self.name();
            self.base.prepare(name).await?;
            if self.base.is_empty() {
                self.base.state_mut().set_done();
            }
            Ok(())
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        let Some(last) = self.last_idx() else {
            self.base.state_mut().set_done();
            return Ok(false);
        };
        if !self.base.child_mut(last)?.next()? {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        self.advance_to_last()
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        let Some(last) = self.last_idx() else {
            self.base.state_mut().set_done();
            return Ok(false);
        };
        if !self.base.child_mut(last)?.skip_to(target)? {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        self.advance_to_last()
    }

    fn current(&self) -> &Record {
        self.last().map_or_else(|| Record::empty_ref(), |c| c.current())
    }

    fn key(&self) -> &Record {
        self.last().map_or_else(|| Record::empty_ref(), |c| c.key())
    }

    fn order_preserving(&self) -> bool {
        true
    }

    fn child_count(&self) -> usize {
        self.base.len()
    }
}
