use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::marker::PhantomData;

use futures::future::BoxFuture;

use strata_core::error::Result;
use strata_core::item::{Id, Record};

use crate::composite::CompositeIterator;
use crate::sort::cmp_records;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, Phase, RecordIterator};

/// How an [`OrIterator`] orders its children's heads.
pub trait MergeOrder: Send + Sync + 'static {
    type Key: Ord + Send;

    const NAME: &'static str;

    /// `skip_to` pops every head above the target (true) or only heads
    /// sitting exactly on it (false).
    const SKIPS_PAST_TARGET: bool;

    fn key_of(rec: &Record) -> Self::Key;
}

/// Highest id first.
pub struct IdOrder;

impl MergeOrder for IdOrder {
    type Key = Id;

    const NAME: &'static str = "union";
    const SKIPS_PAST_TARGET: bool = true;

    fn key_of(rec: &Record) -> Id {
        rec.id()
    }
}

/// Greatest record first, by `(value, ts, id)`.
pub struct ValueOrder;

impl MergeOrder for ValueOrder {
    type Key = ValueKey;

    const NAME: &'static str = "sorted_merge";
    const SKIPS_PAST_TARGET: bool = false;

    fn key_of(rec: &Record) -> ValueKey {
        ValueKey(rec.clone())
    }
}

/// Snapshot of a child's head record used as a heap key.
pub struct ValueKey(Record);

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ValueKey {}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_records(&self.0, &other.0)
    }
}

struct HeapEntry<K> {
    key: K,
    child: usize,
}

impl<K: Ord> PartialEq for HeapEntry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: Ord> Eq for HeapEntry<K> {}

impl<K: Ord> PartialOrd for HeapEntry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for HeapEntry<K> {
    // Equal keys: the earlier child surfaces first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| other.child.cmp(&self.child))
    }
}

/// Heap-driven union of child streams.
///
/// Children sitting on the id just emitted are advanced together, so an id
/// present in several children is emitted once. `current()` is the head
/// child's record.
pub struct OrIterator<O: MergeOrder> {
    base: CompositeIterator,
    heap: BinaryHeap<HeapEntry<O::Key>>,
    phase: Phase,
    _order: PhantomData<O>,
}

/// Union ordered by descending id.
pub type UnionIterator = OrIterator<IdOrder>;

/// Union ordered by descending record value.
pub type SortedMergeIterator = OrIterator<ValueOrder>;

impl<O: MergeOrder> OrIterator<O> {
    pub fn new(children: Vec<BoxedIterator>) -> Self {
        Self::from_slots(children.into_iter().map(Some).collect())
    }

    pub fn from_slots(children: Vec<Option<BoxedIterator>>) -> Self {
        Self {
            base: CompositeIterator::from_slots(children),
            heap: BinaryHeap::new(),
            phase: Phase::NotStarted,
            _order: PhantomData,
        }
    }

    /// Position every child on its first record and build the heap.
    fn start(&mut self) -> Result<()> {
        self.phase = Phase::Active;
        for idx in 0..self.base.len() {
            let Some(child) = self.base.slots_mut()[idx].as_mut() else {
                continue;
            };
            if child.id() == Id::MAX && !child.done() {
                child.next()?;
            }
            if !child.done() {
                self.heap.push(HeapEntry {
                    key: O::key_of(child.current()),
                    child: idx,
                });
            }
        }
        if self.heap.is_empty() {
            self.base.state_mut().set_done();
        }
        Ok(())
    }

    /// Pop the head child, move it with `step`, push it back unless it ran
    /// out.
    fn cycle_head<F>(&mut self, mut step: F) -> Result<()>
    where
        F: FnMut(&mut BoxedIterator) -> Result<bool>,
    {
        let Some(entry) = self.heap.pop() else {
            return Ok(());
        };
        let child = self.base.child_mut(entry.child)?;
        if step(child)? {
            let key = O::key_of(child.current());
            self.heap.push(HeapEntry {
                key,
                child: entry.child,
            });
        }
        Ok(())
    }

    fn head(&self) -> Option<&BoxedIterator> {
        let entry = self.heap.peek()?;
        self.base.slots().get(entry.child)?.as_ref()
    }

    fn head_id(&self) -> Option<Id> {
        self.head().map(|c| c.id())
    }

    /// Indices of children still in the heap, in child order.
    pub(crate) fn active_children(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = self.heap.iter().map(|e| e.child).collect();
        idx.sort_unstable();
        idx
    }

    pub(crate) fn head_child(&self) -> Option<usize> {
        self.heap.peek().map(|e| e.child)
    }

    pub(crate) fn composite(&self) -> &CompositeIterator {
        &self.base
    }
}

impl<O: MergeOrder> RecordIterator for OrIterator<O> {
    fn name(&self) -> &'static str {
        O::NAME
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Composite
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let name = self.name();
            self.base.prepare(name).await
        })
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        let mut current = self.id();
        if self.phase == Phase::NotStarted {
            self.start()?;
            current = Id::MAX;
        }
        while let Some(head) = self.head_id() {
            if head != current && head != Id::MAX {
                break;
            }
            self.cycle_head(|c| c.next())?;
        }
        if self.heap.is_empty() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if self.phase == Phase::NotStarted {
            self.start()?;
        }
        while let Some(head) = self.head_id() {
            let pop = if O::SKIPS_PAST_TARGET {
                head > target
            } else {
                head == target
            };
            if !pop {
                break;
            }
            self.cycle_head(|c| c.skip_to(target))?;
        }
        if self.heap.is_empty() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn current(&self) -> &Record {
        if self.done() {
            return Record::empty_ref();
        }
        match self.head() {
            Some(child) if self.phase == Phase::Active => child.current(),
            _ => Record::empty_ref(),
        }
    }

    fn key(&self) -> &Record {
        self.base.key()
    }

    fn child_count(&self) -> usize {
        self.base.len()
    }
}
