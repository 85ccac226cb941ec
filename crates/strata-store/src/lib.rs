#![forbid(unsafe_code)]
//! strata-store: leaf iterators over sorted key/value stores.
//!
//! The kernel needs leaves that yield ids highest first. `KvCursor` is the
//! boundary a store implements; `MemoryStore` is the in-process backend and
//! `codec` the id key layout that makes reverse bytewise order id order.

pub mod codec;
pub mod cursor;
pub mod leaf;
pub mod memory;

pub use codec::{decode_id, encode_id};
pub use cursor::KvCursor;
pub use leaf::{StoreIterator, ValueFormat};
pub use memory::{MemoryCursor, MemoryStore};
