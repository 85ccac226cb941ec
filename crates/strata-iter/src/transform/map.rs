use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Per-record rewrite applied by [`MapIterator`].
pub trait RecordMap: Send {
    const NAME: &'static str;

    /// Derive the emitted record from the child's current one.
    fn apply(&self, rec: &Record) -> Result<Record>;
}

/// Emits `M::apply` of every child record, in child order.
///
/// The derived record is rebuilt on each advance; references to a previous
/// value do not survive `next()`.
pub struct MapIterator<M> {
    base: WrappedIterator,
    map: M,
    value: Option<Record>,
}

impl<M: RecordMap> MapIterator<M> {
    pub fn with_map(inner: BoxedIterator, map: M) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            map,
            value: None,
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    fn store(&mut self, advanced: bool) -> Result<bool> {
        self.value = None;
        if advanced {
            self.value = Some(self.map.apply(self.base.inner_current())?);
        }
        Ok(advanced)
    }
}

impl<M: RecordMap> RecordIterator for MapIterator<M> {
    fn name(&self) -> &'static str {
        M::NAME
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
        let advanced = self.base.advance_inner()?;
        self.store(advanced)
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        let advanced = self.base.skip_inner_to(target)?;
        self.store(advanced)
    }

    fn current(&self) -> &Record {
        self.value.as_ref().unwrap_or_else(|| Record::empty_ref())
    }

    fn key(&self) -> &Record {
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
