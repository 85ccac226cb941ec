#![forbid(unsafe_code)]
//! strata-iter: the pull iterator protocol and the operators built on it.
//!
//! Design intent:
//! - Every node is a `RecordIterator`. `prepare()` is async and resolves the
//!   whole subtree; pulling (`next`, `skip_to`, `skip`) is synchronous.
//! - Streams are ordered by descending id. Set algebra relies on it.
//! - Nodes own their children outright (`Box<dyn RecordIterator>`).
//! - No storage here; leaves over key-value stores live in `strata-store`.

pub mod agg;
pub mod composite;
pub mod leaf;
pub mod set;
pub mod traits;
pub mod transform;
pub mod wrapped;

mod sort;

pub use agg::{GroupByIterator, GroupBySortedCountIterator, MergeIterator, OrderByIterator};
pub use composite::CompositeIterator;
pub use leaf::VecIterator;
pub use set::{
    AndIterator, ConcatIterator, DifferenceIterator, SortedMergeIterator, UnionIterator,
};
pub use traits::{BoxedIterator, IterState, IteratorKind, Phase, RecordIterator, ResultOrder};
pub use transform::{
    CountIterator, FilterIterator, FilterType, LetIterator, LimitIterator, NestIterator,
    ProjectIterator, RandomIterator, ReverseIterator,
};
pub use wrapped::WrappedIterator;
