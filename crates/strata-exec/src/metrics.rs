//! Phase timings for engine calls, and the trace events that report them.
//!
//! Events are emitted only with the `tracing` feature; the timings are
//! always collected and returned in the run summary.

use std::time::Duration;

use serde::Serialize;

use strata_iter::traits::RecordIterator;

/// Wall time spent in each phase of a run, plus the rows drained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseTimings {
    pub prepare_ms: u128,
    pub drain_ms: u128,
    pub rows: usize,
}

impl PhaseTimings {
    pub fn total_ms(&self) -> u128 {
        self.prepare_ms + self.drain_ms
    }

    /// Rows per second over the drain phase. `None` for an instant drain.
    pub fn drain_rate(&self) -> Option<f64> {
        (self.drain_ms > 0).then(|| self.rows as f64 * 1000.0 / self.drain_ms as f64)
    }
}

#[cfg(feature = "tracing")]
pub(crate) fn trace_prepare(root: &dyn RecordIterator, ok: bool, elapsed: Duration) {
    tracing::trace!(
        target: "strata::exec",
        iterator = root.name(),
        kind = ?root.kind(),
        children = root.child_count(),
        ok,
        elapsed_ms = elapsed.as_millis() as u64,
        "prepare finished"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn trace_prepare(_root: &dyn RecordIterator, _ok: bool, _elapsed: Duration) {}

#[cfg(feature = "tracing")]
pub(crate) fn trace_run(root: &dyn RecordIterator, timings: &PhaseTimings, exhausted: bool) {
    let _span = tracing::trace_span!("strata_run", iterator = root.name()).entered();
    tracing::trace!(
        target: "strata::exec",
        rows = timings.rows,
        exhausted,
        prepare_ms = timings.prepare_ms as u64,
        drain_ms = timings.drain_ms as u64,
        "run finished"
    );
}

#[cfg(not(feature = "tracing"))]
pub(crate) fn trace_run(_root: &dyn RecordIterator, _timings: &PhaseTimings, _exhausted: bool) {}
