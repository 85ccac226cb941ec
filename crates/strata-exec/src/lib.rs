#![forbid(unsafe_code)]
//! strata-exec: drives iterator trees to completion.
//!
//! The engine owns the async runtime used by the prepare phase, then pulls
//! the root synchronously and reports what it drained.

pub mod metrics;
pub mod runtime;

pub use runtime::{Engine, ExecError, RunSummary};
