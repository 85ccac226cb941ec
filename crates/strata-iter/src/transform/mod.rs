//! Single-child transforms.

mod count;
mod filter;
mod limit;
mod map;
mod nest;
mod project;
mod random;
mod rename;
mod reverse;

pub use count::{CountIterator, COUNT_KEY};
pub use filter::{FilterIterator, FilterType};
pub use limit::LimitIterator;
pub use map::{MapIterator, RecordMap};
pub use nest::{NestIterator, Nesting};
pub use project::{ProjectIterator, Projection};
pub use random::RandomIterator;
pub use rename::{LetIterator, Rename};
pub use reverse::ReverseIterator;
