use std::collections::HashSet;

use futures::future::BoxFuture;

use strata_core::config::EngineConfig;
use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::composite::CompositeIterator;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};

/// Children drained one after another, in child order.
///
/// With de-duplication on, an id already emitted by an earlier child is
/// skipped. The output is not id ordered, so `skip_to` is unsupported and
/// returns `false` without moving.
pub struct ConcatIterator {
    base: CompositeIterator,
    active: Vec<usize>,
    idx: usize,
    seen: HashSet<Id>,
    dedup: bool,
}

impl ConcatIterator {
    pub fn new(children: Vec<BoxedIterator>) -> Self {
        Self::with_dedup(children, true)
    }

    pub fn with_dedup(children: Vec<BoxedIterator>, dedup: bool) -> Self {
        Self::from_slots(children.into_iter().map(Some).collect(), dedup)
    }

    pub fn with_config(children: Vec<BoxedIterator>, config: &EngineConfig) -> Self {
        Self::with_dedup(children, config.concat_dedup)
    }

    pub fn from_slots(children: Vec<Option<BoxedIterator>>, dedup: bool) -> Self {
        Self {
            base: CompositeIterator::from_slots(children),
            active: Vec::new(),
            idx: 0,
            seen: HashSet::new(),
            dedup,
        }
    }

    fn current_child(&self) -> Option<&BoxedIterator> {
        if self.done() {
            return None;
        }
        let slot = *self.active.get(self.idx)?;
        self.base.slots().get(slot)?.as_ref()
    }
}

impl RecordIterator for ConcatIterator {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Composite
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.base.state().is_prepared() {
                return Ok(());
            }
            let name = self.name();
            self.base.prepare_children(name).await?;
            self.active = self
                .base
                .slots()
                .iter()
                .enumerate()
                .filter(|(_, c)| c.as_ref().is_some_and(|c| !c.done()))
                .map(|(i, _)| i)
                .collect();
            if self.active.is_empty() {
                self.base.state_mut().set_done();
            }
            Ok(())
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        loop {
            let Some(&slot) = self.active.get(self.idx) else {
                self.base.state_mut().set_done();
                return Ok(false);
            };
            let child = self.base.child_mut(slot)?;
            if !child.next()? {
                self.idx += 1;
                continue;
            }
            let id = child.id();
            if self.dedup && self.seen.contains(&id) {
                continue;
            }
            let key = child.key().clone();
            self.base.set_key(key);
            self.seen.insert(id);
            return Ok(true);
        }
    }

    fn do_skip_to(&mut self, _target: Id) -> Result<bool> {
        Ok(false)
    }

    fn current(&self) -> &Record {
        match self.current_child() {
            Some(child) => child.current(),
            None => Record::empty_ref(),
        }
    }

    fn key(&self) -> &Record {
        self.base.key()
    }

    fn child_count(&self) -> usize {
        self.base.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::VecIterator;
    use futures::executor::block_on;

    fn leaf(ids: &[u64]) -> BoxedIterator {
        Box::new(VecIterator::from_ids(ids.iter().copied()))
    }

    fn drain(it: &mut dyn RecordIterator) -> Vec<u64> {
        let mut out = Vec::new();
        while it.next().unwrap() {
            out.push(it.id());
        }
        out
    }

    #[test]
    fn concatenates_in_child_order_without_duplicates() {
        let mut c = ConcatIterator::new(vec![leaf(&[3, 1]), leaf(&[]), leaf(&[4, 3, 2])]);
        block_on(c.prepare()).unwrap();
        assert_eq!(drain(&mut c), vec![3, 1, 4, 2]);
        assert!(c.done());
    }

    #[test]
    fn keeps_duplicates_when_asked() {
        let mut c = ConcatIterator::with_dedup(vec![leaf(&[3, 1]), leaf(&[3])], false);
        block_on(c.prepare()).unwrap();
        assert_eq!(drain(&mut c), vec![3, 1, 3]);
    }

    #[test]
    fn skip_to_is_unsupported() {
        let mut c = ConcatIterator::new(vec![leaf(&[5, 4])]);
        block_on(c.prepare()).unwrap();
        assert!(!c.skip_to(4).unwrap());
        assert!(c.next().unwrap());
        assert_eq!(c.id(), 5);
    }

    #[test]
    fn missing_slots_are_ignored() {
        let mut c = ConcatIterator::from_slots(vec![None, Some(leaf(&[7]))], true);
        block_on(c.prepare()).unwrap();
        assert_eq!(drain(&mut c), vec![7]);

        let mut c = ConcatIterator::from_slots(vec![None], true);
        block_on(c.prepare()).unwrap();
        assert!(c.done());
    }
}
