use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::set::UnionIterator;
use crate::traits::{BoxedIterator, IterState, IteratorKind, RecordIterator};

/// Union that folds records sharing an id into one.
///
/// The emitted record takes id and timestamp from the head child; payloads
/// of the other children on the same id are merged into it in child order
/// (see `Dynamic::merge`).
pub struct MergeIterator {
    union: UnionIterator,
    value: Record,
}

impl MergeIterator {
    pub fn new(children: Vec<BoxedIterator>) -> Self {
        Self {
            union: UnionIterator::new(children),
            value: Record::empty_ref().clone(),
        }
    }

    fn store_data(&mut self, advanced: bool) -> Result<bool> {
        let Some(head) = self.union.head_child().filter(|_| advanced) else {
            self.value = Record::empty_ref().clone();
            return Ok(false);
        };
        let base = self.union.composite();
        let mut merged = base.child(head)?.current().clone();
        for idx in self.union.active_children() {
            if idx == head {
                continue;
            }
            let child = base.child(idx)?;
            if child.id() == merged.id() {
                merged.value_mut().merge(child.current().value())?;
            }
        }
        self.value = merged;
        Ok(true)
    }
}

impl RecordIterator for MergeIterator {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Composite
    }

    fn state(&self) -> &IterState {
        self.union.state()
    }

    fn state_mut(&mut self) -> &mut IterState {
        self.union.state_mut()
    }

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        self.union.prepare()
    }

    fn do_next(&mut self) -> Result<bool> {
        let advanced = self.union.do_next()?;
        self.store_data(advanced)
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        let advanced = self.union.do_skip_to(target)?;
        self.store_data(advanced)
    }

    fn current(&self) -> &Record {
        &self.value
    }

    fn key(&self) -> &Record {
        self.union.key()
    }

    fn child_count(&self) -> usize {
        self.union.child_count()
    }
}
