#![forbid(unsafe_code)]
//! strata-core: the value model and record types of the strata kernel.
//!
//! Design intent:
//! - `Dynamic` is a closed sum type; every operation is an exhaustive match.
//! - Invalid combinations (ordering unordered maps, mixed kinds) are errors,
//!   never panics. Lookups that are expected to miss have non-failing forms.
//! - No async, no I/O. Iterators and drivers live in downstream crates.

pub mod config;
pub mod dynamic;
pub mod error;
pub mod item;
pub mod log;
pub mod order;
pub mod prelude;

#[doc(hidden)]
pub use tracing as __tracing;

pub use config::EngineConfig;
pub use dynamic::{Dynamic, Kind, PairedView, SortedMap};
pub use error::{Error, Result};
pub use item::{Id, Item, ItemOptimized, Record, ID_KEY, TIME_KEY};
pub use order::{partial_compare, partial_compare_desc, PartialOrder};
