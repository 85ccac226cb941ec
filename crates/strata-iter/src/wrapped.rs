//! Base for nodes that own a single child.

use futures::future::BoxFuture;

use strata_core::error::{Error, Result};
use strata_core::item::{Id, Record};

use crate::traits::{BoxedIterator, IterState, IteratorKind, RecordIterator};

/// One child slot plus lifecycle state.
///
/// Used on its own it is a pass-through node. Transforming operators embed
/// it and override what they change.
pub struct WrappedIterator {
    inner: Option<BoxedIterator>,
    state: IterState,
}

impl WrappedIterator {
    pub fn new(inner: BoxedIterator) -> Self {
        Self {
            inner: Some(inner),
            state: IterState::new(),
        }
    }

    /// A wrapper with no child. It is done once prepared.
    pub fn empty() -> Self {
        Self {
            inner: None,
            state: IterState::new(),
        }
    }

    pub fn state(&self) -> &IterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut IterState {
        &mut self.state
    }

    pub fn has_inner(&self) -> bool {
        self.inner.is_some()
    }

    pub fn inner(&self) -> Result<&BoxedIterator> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Invariant("wrapped iterator has no child".into()))
    }

    pub fn inner_mut(&mut self) -> Result<&mut BoxedIterator> {
        self.inner
            .as_mut()
            .ok_or_else(|| Error::Invariant("wrapped iterator has no child".into()))
    }

    /// The child's current record, or the empty record without a child.
    pub fn inner_current(&self) -> &Record {
        match &self.inner {
            Some(inner) => inner.current(),
            None => Record::empty_ref(),
        }
    }

    pub fn inner_key(&self) -> &Record {
        match &self.inner {
            Some(inner) => inner.key(),
            None => Record::empty_ref(),
        }
    }

    /// Delegate to the child and mark prepared once it settles, failure
    /// included.
    ///
    /// Only a missing child makes the wrapper done here. A child that is
    /// already exhausted is noticed on the first pull.
    pub async fn prepare_inner(&mut self) -> Result<()> {
        if self.state.is_prepared() {
            return Ok(());
        }
        let res = match self.inner.as_mut() {
            Some(inner) => inner.prepare().await,
            None => {
                self.state.set_done();
                Ok(())
            }
        };
        self.state.mark_prepared();
        res
    }

    /// Pull the child once, becoming done when it is exhausted.
    pub fn advance_inner(&mut self) -> Result<bool> {
        let Some(inner) = self.inner.as_mut() else {
            self.state.set_done();
            return Ok(false);
        };
        if inner.next()? {
            Ok(true)
        } else {
            self.state.set_done();
            Ok(false)
        }
    }

    pub fn skip_inner_to(&mut self, target: Id) -> Result<bool> {
        let Some(inner) = self.inner.as_mut() else {
            self.state.set_done();
            return Ok(false);
        };
        if inner.skip_to(target)? {
            Ok(true)
        } else {
            self.state.set_done();
            Ok(false)
        }
    }
}

impl RecordIterator for WrappedIterator {
    fn name(&self) -> &'static str {
        "wrapped"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    fn state(&self) -> &IterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut IterState {
        &mut self.state
    }

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        self.advance_inner()
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        self.skip_inner_to(target)
    }

    fn current(&self) -> &Record {
        self.inner_current()
    }

    fn key(&self) -> &Record {
        self.inner_key()
    }

    fn cookie(&self) -> String {
        self.inner
            .as_ref()
            .map_or_else(|| self.inner_current().cookie(), |i| i.cookie())
    }

    fn order_preserving(&self) -> bool {
        true
    }

    fn child_count(&self) -> usize {
        usize::from(self.inner.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::VecIterator;
    use futures::executor::block_on;

    #[test]
    fn passes_records_through() {
        let mut w = WrappedIterator::new(Box::new(VecIterator::from_ids([5, 3, 1])));
        block_on(w.prepare()).unwrap();
        let mut seen = Vec::new();
        while w.next().unwrap() {
            seen.push(w.value().unwrap().id());
        }
        assert_eq!(seen, vec![5, 3, 1]);
        assert!(w.done());
    }

    #[test]
    fn empty_wrapper_is_done() {
        let mut w = WrappedIterator::empty();
        assert!(w.next().is_err());
        block_on(w.prepare()).unwrap();
        assert!(w.done());
        assert!(!w.next().unwrap());
        assert_eq!(w.id(), u64::MAX);
    }

    #[test]
    fn exhausted_child_is_noticed_on_first_pull() {
        use crate::set::AndIterator;
        let leaf: BoxedIterator = Box::new(VecIterator::from_ids([2, 1]));
        let and = AndIterator::from_slots(vec![Some(leaf), None]);
        let mut w = WrappedIterator::new(Box::new(and));
        block_on(w.prepare()).unwrap();
        assert!(w.inner().unwrap().done());
        assert!(!w.done());
        assert!(!w.next().unwrap());
        assert!(w.done());
    }

    #[test]
    fn skip_to_delegates() {
        let mut w = WrappedIterator::new(Box::new(VecIterator::from_ids([9, 7, 4, 2])));
        block_on(w.prepare()).unwrap();
        assert!(w.skip_to(5).unwrap());
        assert_eq!(w.id(), 4);
        assert!(!w.skip_to(0).unwrap());
    }
}
