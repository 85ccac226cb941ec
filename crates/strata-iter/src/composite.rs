//! Base for nodes that own several children.

use futures::future::join_all;
use tracing::{debug, error};

use strata_core::error::{Error, Result};
use strata_core::item::Record;

use crate::traits::{BoxedIterator, IterState};

/// Ordered child slots plus shared lifecycle state.
///
/// A slot may be empty; a composite with an empty slot is done as soon as it
/// is prepared.
pub struct CompositeIterator {
    children: Vec<Option<BoxedIterator>>,
    state: IterState,
    key: Record,
}

impl CompositeIterator {
    pub fn new(children: Vec<BoxedIterator>) -> Self {
        Self::from_slots(children.into_iter().map(Some).collect())
    }

    pub fn from_slots(children: Vec<Option<BoxedIterator>>) -> Self {
        Self {
            children,
            state: IterState::new(),
            key: Record::empty_ref().clone(),
        }
    }

    pub fn state(&self) -> &IterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut IterState {
        &mut self.state
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn key(&self) -> &Record {
        &self.key
    }

    pub fn set_key(&mut self, key: Record) {
        self.key = key;
    }

    pub fn slots(&self) -> &[Option<BoxedIterator>] {
        &self.children
    }

    pub fn slots_mut(&mut self) -> &mut [Option<BoxedIterator>] {
        &mut self.children
    }

    pub fn child(&self, idx: usize) -> Result<&BoxedIterator> {
        self.children
            .get(idx)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::Invariant(format!("child {idx} is missing")))
    }

    pub fn child_mut(&mut self, idx: usize) -> Result<&mut BoxedIterator> {
        self.children
            .get_mut(idx)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::Invariant(format!("child {idx} is missing")))
    }

    /// Whether some slot is empty or its child is exhausted.
    pub fn any_missing_or_done(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.as_ref().map_or(true, |c| c.done()))
    }

    /// Prepare every present child concurrently and wait for all of them.
    ///
    /// The composite is marked prepared whatever the outcome. When several
    /// children fail, each failure is logged and the first one is returned.
    pub async fn prepare_children(&mut self, name: &'static str) -> Result<()> {
        if self.state.is_prepared() {
            return Ok(());
        }

        let results = join_all(self.children.iter_mut().flatten().map(|c| c.prepare())).await;
        self.state.mark_prepared();

        let mut first = None;
        for err in results.into_iter().filter_map(|r| r.err()) {
            error!(iterator = name, error = %err, "child failed to prepare");
            first.get_or_insert(err);
        }
        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Default composite preparation: children first, then become done if any
    /// child is absent or exhausted, otherwise adopt the first child's key.
    pub async fn prepare(&mut self, name: &'static str) -> Result<()> {
        if self.state.is_prepared() {
            return Ok(());
        }
        self.prepare_children(name).await?;

        if self.any_missing_or_done() {
            debug!(iterator = name, "a child is missing or exhausted");
            self.state.set_done();
        } else if let Some(Some(first)) = self.children.first() {
            self.key = first.key().clone();
        }
        Ok(())
    }
}
