use futures::future::BoxFuture;
use tracing::debug;

use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::composite::CompositeIterator;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};

const MINUEND: usize = 0;
const SUBTRAHEND: usize = 1;

/// Ids of the first child that the second child does not contain.
pub struct DifferenceIterator {
    base: CompositeIterator,
}

impl DifferenceIterator {
    pub fn new(minuend: BoxedIterator, subtrahend: BoxedIterator) -> Self {
        Self::from_slots(Some(minuend), Some(subtrahend))
    }

    /// A missing subtrahend removes nothing; a missing minuend yields
    /// nothing.
    pub fn from_slots(minuend: Option<BoxedIterator>, subtrahend: Option<BoxedIterator>) -> Self {
        Self {
            base: CompositeIterator::from_slots(vec![minuend, subtrahend]),
        }
    }

    /// Step the minuend past every id the subtrahend also holds.
    fn advance_to_next_difference(&mut self) -> Result<bool> {
        let [Some(first), second] = self.base.slots_mut() else {
            self.base.state_mut().set_done();
            return Ok(false);
        };
        let Some(second) = second.as_mut() else {
            return Ok(true);
        };
        while second.skip_to(first.id())? && first.id() == second.id() {
            if !first.next()? {
                self.base.state_mut().set_done();
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl RecordIterator for DifferenceIterator {
    fn name(&self) -> &'static str {
        "difference"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Binary
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.base.state().is_prepared() {
                return Ok(());
            }
            let name = self.name();
            self.base.prepare_children(name).await?;
            match self.base.child(MINUEND) {
                Ok(first) if !first.done() => {
                    let key = first.key().clone();
                    self.base.set_key(key);
                }
                _ => {
                    debug!(iterator = name, "minuend is missing or exhausted");
                    self.base.state_mut().set_done();
                }
            }
            Ok(())
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if !self.base.child_mut(MINUEND)?.next()? {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        self.advance_to_next_difference()
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if !self.base.child_mut(MINUEND)?.skip_to(target)? {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        self.advance_to_next_difference()
    }

    fn current(&self) -> &Record {
        match self.base.child(MINUEND) {
            Ok(first) => first.current(),
            Err(_) => Record::empty_ref(),
        }
    }

    fn key(&self) -> &Record {
        self.base.key()
    }

    fn order_preserving(&self) -> bool {
        true
    }

    fn child_count(&self) -> usize {
        usize::from(self.base.child(MINUEND).is_ok())
            + usize::from(self.base.child(SUBTRAHEND).is_ok())
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
    fn removes_common_ids() {
        let mut d = DifferenceIterator::new(leaf(&[9, 7, 5, 3, 1]), leaf(&[8, 7, 3, 2]));
        block_on(d.prepare()).unwrap();
        assert_eq!(drain(&mut d), vec![9, 5, 1]);
    }

    #[test]
    fn trailing_matches_exhaust() {
        let mut d = DifferenceIterator::new(leaf(&[4, 2]), leaf(&[4, 2]));
        block_on(d.prepare()).unwrap();
        assert!(drain(&mut d).is_empty());
        assert!(d.done());
    }

    #[test]
    fn empty_or_missing_subtrahend_keeps_everything() {
        let mut d = DifferenceIterator::new(leaf(&[3, 2]), leaf(&[]));
        block_on(d.prepare()).unwrap();
        assert_eq!(drain(&mut d), vec![3, 2]);

        let mut d = DifferenceIterator::from_slots(Some(leaf(&[3])), None);
        block_on(d.prepare()).unwrap();
        assert_eq!(drain(&mut d), vec![3]);
    }

    #[test]
    fn missing_minuend_is_done() {
        let mut d = DifferenceIterator::from_slots(None, Some(leaf(&[1])));
        block_on(d.prepare()).unwrap();
        assert!(d.done());
        assert!(!d.next().unwrap());
    }

    #[test]
    fn skip_to_then_next() {
        let mut d = DifferenceIterator::new(leaf(&[9, 7, 6, 4]), leaf(&[7, 6]));
        block_on(d.prepare()).unwrap();
        assert!(d.skip_to(8).unwrap());
        assert_eq!(d.id(), 4);
        assert!(!d.next().unwrap());
    }
}
