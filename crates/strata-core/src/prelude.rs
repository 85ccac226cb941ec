//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::dynamic::{Dynamic, Kind, PairedView, SortedMap};
pub use crate::error::{Error, Result};
pub use crate::item::{Id, Item, ItemOptimized, Record, ID_KEY, TIME_KEY};
pub use crate::order::{partial_compare, partial_compare_desc, PartialOrder};
