use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::Record;
use strata_core::log::LOG_EVERY_N;
use strata_core::order::{partial_compare, PartialOrder};
use strata_core::warn_every_n;

use crate::traits::{delegate_state, BoxedIterator, IteratorKind, Phase, RecordIterator};
use crate::wrapped::WrappedIterator;

struct SortSpec {
    columns: Vec<String>,
    descending: Vec<bool>,
}

struct Entry {
    record: Record,
    seq: usize,
    spec: Arc<SortSpec>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Max-heap: the record that sorts first is the greatest. Ties and
    // incomparable pairs fall back to input order.
    fn cmp(&self, other: &Self) -> Ordering {
        let spec = &self.spec;
        match partial_compare(&self.record, &other.record, &spec.columns, &spec.descending) {
            PartialOrder::Lt => Ordering::Less,
            PartialOrder::Gt => Ordering::Greater,
            order => {
                if order == PartialOrder::None {
                    warn_every_n!(
                        LOG_EVERY_N,
                        lhs = self.record.id(),
                        rhs = other.record.id(),
                        "order by keys are not comparable, keeping input order"
                    );
                }
                other.seq.cmp(&self.seq)
            }
        }
    }
}

/// Buffers the whole input and emits it sorted on the given columns.
///
/// Each column is descending unless its flag says otherwise. Equal and
/// incomparable records keep their input order.
pub struct OrderByIterator {
    base: WrappedIterator,
    spec: Arc<SortSpec>,
    phase: Phase,
    heap: BinaryHeap<Entry>,
    current: Option<Record>,
}

impl OrderByIterator {
    /// All columns descending.
    pub fn new(inner: BoxedIterator, columns: Vec<String>) -> Self {
        let descending = vec![true; columns.len()];
        Self::with_directions(inner, columns, descending)
    }

    /// `descending[i]` applies to `columns[i]`; missing flags mean
    /// descending.
    pub fn with_directions(inner: BoxedIterator, columns: Vec<String>, mut descending: Vec<bool>) -> Self {
        descending.resize(columns.len(), true);
        Self {
            base: WrappedIterator::new(inner),
            spec: Arc::new(SortSpec { columns, descending }),
            phase: Phase::NotStarted,
            heap: BinaryHeap::new(),
            current: None,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.spec.columns
    }

    pub fn descending(&self) -> &[bool] {
        &self.spec.descending
    }

    fn load(&mut self) -> Result<()> {
        let inner = self.base.inner_mut()?;
        let mut seq = 0;
        while inner.next()? {
            self.heap.push(Entry {
                record: inner.current().clone(),
                seq,
                spec: Arc::clone(&self.spec),
            });
            seq += 1;
        }
        Ok(())
    }
}

impl RecordIterator for OrderByIterator {
    fn name(&self) -> &'static str {
        "order_by"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::OrderBy
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
        match self.heap.pop() {
            Some(entry) => {
                self.current = Some(entry.record);
                Ok(true)
            }
            None => {
                self.current = None;
                self.base.state_mut().set_done();
                Ok(false)
            }
        }
    }

    fn current(&self) -> &Record {
        self.current.as_ref().unwrap_or_else(|| Record::empty_ref())
    }

    fn num_buffered(&self) -> Option<usize> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::Active => Some(self.heap.len()),
        }
    }

    fn child_count(&self) -> usize {
        1
    }
}
