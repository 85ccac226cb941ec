//! Set algebra over id-ordered streams.

mod and;
mod concat;
mod difference;
mod or;

pub use and::AndIterator;
pub use concat::ConcatIterator;
pub use difference::DifferenceIterator;
pub use or::{IdOrder, MergeOrder, OrIterator, SortedMergeIterator, UnionIterator, ValueKey, ValueOrder};
