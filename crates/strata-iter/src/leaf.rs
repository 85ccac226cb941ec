//! In-memory leaf: a fixed batch of records, optionally produced by a future.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

use strata_core::dynamic::Dynamic;
use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::traits::{IterState, IteratorKind, RecordIterator};

/// Yields a batch of records in the order given.
///
/// Callers are expected to hand in records sorted by descending id; the
/// batch is not re-sorted. When built from a future, the batch is resolved
/// by `prepare()`.
pub struct VecIterator {
    state: IterState,
    pending: Option<BoxFuture<'static, Result<Vec<Record>>>>,
    records: Vec<Record>,
    idx: usize,
    order_columns: Vec<String>,
}

impl VecIterator {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            state: IterState::new(),
            pending: None,
            records,
            idx: 0,
            order_columns: Vec::new(),
        }
    }

    /// Records with the given ids, timestamp 0 and a null payload.
    pub fn from_ids(ids: impl IntoIterator<Item = Id>) -> Self {
        Self::new(ids.into_iter().map(Record::with_id).collect())
    }

    /// Records with the given ids and payloads, timestamp 0.
    pub fn from_values(rows: impl IntoIterator<Item = (Id, Dynamic)>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|(id, value)| Record::new(id, 0, value))
                .collect(),
        )
    }

    /// A leaf whose batch is produced asynchronously during `prepare()`.
    pub fn from_future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Vec<Record>>> + Send + 'static,
    {
        Self {
            pending: Some(fut.boxed()),
            ..Self::new(Vec::new())
        }
    }

    /// Declare the columns the batch is ordered by.
    pub fn with_order(mut self, columns: Vec<String>) -> Self {
        self.order_columns = columns;
        self
    }

    pub fn order_columns(&self) -> &[String] {
        &self.order_columns
    }

    pub fn remaining(&self) -> usize {
        self.records.len() - self.idx
    }
}

impl RecordIterator for VecIterator {
    fn name(&self) -> &'static str {
        "vec"
    }

    fn kind(&self) -> IteratorKind {
        if self.pending.is_some() {
            IteratorKind::Future
        } else {
            IteratorKind::Leaf
        }
    }

    fn state(&self) -> &IterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut IterState {
        &mut self.state
    }

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.state.is_prepared() {
                return Ok(());
            }
            let res = match self.pending.take() {
                Some(fut) => fut.await.map(|records| self.records = records),
                None => Ok(()),
            };
            self.state.mark_prepared();
            res
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.state.is_done() || self.idx >= self.records.len() {
            self.state.set_done();
            return Ok(false);
        }
        self.idx += 1;
        Ok(true)
    }

    fn current(&self) -> &Record {
        match self.idx {
            0 => Record::empty_ref(),
            _ if self.state.is_done() => Record::empty_ref(),
            i => &self.records[i - 1],
        }
    }

    fn cacheable(&self) -> bool {
        true
    }

    fn num_buffered(&self) -> Option<usize> {
        Some(self.remaining())
    }

    fn order_preserving(&self) -> bool {
        true
    }
}
