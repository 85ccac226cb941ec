//! The record iterator protocol.
//!
//! Every node goes through two phases:
//! 1. `prepare()`: asynchronous, runs once per node, may fan out to children
//!    concurrently. Repeated calls after it settled return immediately.
//! 2. `next()` / `skip_to()` / `skip()`: synchronous pulls, only valid after
//!    `prepare()` has settled. Pulling earlier is a protocol violation.
//!
//! Ids are descending: a node starts "before the stream" at id `u64::MAX`
//! and every advance moves to a smaller or equal id.
//!
//! Implementors provide the `do_*` hooks and `current()`; callers use the
//! checked wrappers (`next`, `skip_to`, `skip`, `skip_to_predicate`, `value`).

use futures::future::BoxFuture;

use strata_core::error::{Error, Result};
use strata_core::item::{Id, Record};
use strata_core::order::{partial_compare_desc, PartialOrder};

/// Owned child node.
pub type BoxedIterator = Box<dyn RecordIterator>;

/// Coarse node category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorKind {
    Leaf,
    Store,
    Composite,
    Wrapped,
    Future,
    OrderBy,
    Binary,
}

/// Order guaranteed by a node's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrder {
    /// Descending id, the order of the underlying index.
    #[default]
    Index,
}

/// Progress of operators that buffer their input on the first pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Active,
}

/// Lifecycle flags shared by every node. `prepared` and `done` only ever go
/// from false to true.
#[derive(Debug, Clone, Default)]
pub struct IterState {
    prepared: bool,
    done: bool,
    advanced: bool,
}

impl IterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn advanced_at_least_once(&self) -> bool {
        self.advanced
    }

    pub fn mark_prepared(&mut self) {
        self.prepared = true;
    }

    pub fn set_done(&mut self) {
        self.done = true;
    }

    pub fn mark_advanced(&mut self) {
        self.advanced = true;
    }

    pub fn ensure_prepared(&self, name: &str) -> Result<()> {
        if self.prepared {
            Ok(())
        } else {
            Err(Error::ProtocolViolation(format!(
                "{name} iterator used before prepare()"
            )))
        }
    }
}

/// A pull-based stream of records ordered by descending id.
///
/// Invariants:
/// - `prepare()` must settle before any pull; pulls return
///   [`Error::ProtocolViolation`] otherwise.
/// - Once `done()` is true it stays true.
/// - References returned by `current()`/`value()`/`key()` borrow the node and
///   are invalidated by the next pull.
pub trait RecordIterator: Send {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    fn kind(&self) -> IteratorKind;

    fn state(&self) -> &IterState;

    fn state_mut(&mut self) -> &mut IterState;

    /// Resolve whatever the node needs before pulling. Idempotent.
    fn prepare(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Primitive advance. Returns whether a record is available.
    fn do_next(&mut self) -> Result<bool>;

    /// Advance until the current id is at or below `target`.
    fn do_skip_to(&mut self, target: Id) -> Result<bool> {
        while self.id() > target && self.next()? {}
        Ok(!self.done())
    }

    fn do_skip(&mut self, mut n: usize) -> Result<bool> {
        while n > 0 && self.next()? {
            n -= 1;
        }
        Ok(!self.done())
    }

    /// Advance while `target` sorts strictly below the current record on
    /// `columns` (all descending).
    fn do_skip_to_predicate(&mut self, columns: &[String], target: &Record) -> Result<bool> {
        if self.done() || (!self.advanced_at_least_once() && !self.next()?) {
            return Ok(false);
        }
        while partial_compare_desc(target, self.current(), columns) == PartialOrder::Lt {
            if !self.next()? {
                break;
            }
        }
        Ok(!self.done())
    }

    /// The record the node is positioned on, without protocol checks.
    ///
    /// Before the first advance this is the empty record (id `u64::MAX`).
    fn current(&self) -> &Record;

    /// Grouping or source key for the current position.
    fn key(&self) -> &Record {
        Record::empty_ref()
    }

    fn id(&self) -> Id {
        self.current().id()
    }

    fn done(&self) -> bool {
        self.state().is_done()
    }

    fn prepared(&self) -> bool {
        self.state().is_prepared()
    }

    fn advanced_at_least_once(&self) -> bool {
        self.state().advanced_at_least_once()
    }

    fn next(&mut self) -> Result<bool> {
        self.state().ensure_prepared(self.name())?;
        let advanced = self.do_next()?;
        if advanced {
            self.state_mut().mark_advanced();
        }
        Ok(advanced)
    }

    fn skip_to(&mut self, target: Id) -> Result<bool> {
        self.state().ensure_prepared(self.name())?;
        let advanced = self.do_skip_to(target)?;
        if advanced {
            self.state_mut().mark_advanced();
        }
        Ok(advanced)
    }

    fn skip(&mut self, n: usize) -> Result<bool> {
        self.state().ensure_prepared(self.name())?;
        let advanced = self.do_skip(n)?;
        if advanced {
            self.state_mut().mark_advanced();
        }
        Ok(advanced)
    }

    fn skip_to_predicate(&mut self, columns: &[String], target: &Record) -> Result<bool> {
        self.state().ensure_prepared(self.name())?;
        let advanced = self.do_skip_to_predicate(columns, target)?;
        if advanced {
            self.state_mut().mark_advanced();
        }
        Ok(advanced)
    }

    /// Checked access to the current record.
    fn value(&self) -> Result<&Record> {
        self.state().ensure_prepared(self.name())?;
        Ok(self.current())
    }

    /// Resumable position, `"<ts>,<id>"` of the current record.
    fn cookie(&self) -> String {
        self.current().cookie()
    }

    fn order(&self) -> ResultOrder {
        ResultOrder::Index
    }

    /// Bounded and rewindable.
    fn cacheable(&self) -> bool {
        false
    }

    /// Pulls available without blocking. `None` means every pull is
    /// non-blocking.
    fn num_buffered(&self) -> Option<usize> {
        None
    }

    /// Whether the output keeps the input's id order.
    fn order_preserving(&self) -> bool {
        false
    }

    fn child_count(&self) -> usize {
        0
    }
}

/// Forward `state()`/`state_mut()` to a base field.
macro_rules! delegate_state {
    ($($field:ident).+) => {
        fn state(&self) -> &$crate::traits::IterState {
            self.$($field).+.state()
        }

        fn state_mut(&mut self) -> &mut $crate::traits::IterState {
            self.$($field).+.state_mut()
        }
    };
}

pub(crate) use delegate_state;
