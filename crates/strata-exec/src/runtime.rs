//! Runtime: prepare an iterator tree on a tokio runtime, then drain it.
//!
//! - `prepare` blocks on the root's `prepare()` future. Children of composite
//!   nodes settle concurrently.
//! - `run` prepares and pulls the root up to `max_rows` records.
//! - Pulling stays on the calling thread.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};

use strata_core::config::EngineConfig;
use strata_core::item::Record;
use strata_iter::traits::RecordIterator;

use crate::metrics::{trace_prepare, trace_run, PhaseTimings};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Kernel(#[from] strata_core::Error),
    #[error("runtime: {0}")]
    Runtime(String),
}

/// What a run drained.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: Vec<Record>,
    /// Resume position after the last record, when one was emitted.
    pub cookie: Option<String>,
    /// Whether the root ran out (as opposed to hitting `max_rows`).
    pub exhausted: bool,
    pub elapsed_ms: u128,
    pub timings: PhaseTimings,
}

/// Engine owns the configuration; a runtime is built per prepare.
pub struct Engine {
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    fn runtime(&self) -> Result<Runtime, ExecError> {
        self.cfg.validate()?;
        let built = if self.cfg.worker_threads == 1 {
            Builder::new_current_thread().enable_all().build()
        } else {
            Builder::new_multi_thread()
                .worker_threads(self.cfg.worker_threads)
                .enable_all()
                .build()
        };
        built.map_err(|e| ExecError::Runtime(format!("failed to build tokio runtime: {e}")))
    }

    /// Resolve the whole tree. A second call on the same tree is a no-op.
    pub fn prepare(&self, root: &mut dyn RecordIterator) -> Result<(), ExecError> {
        let rt = self.runtime()?;
        let start = Instant::now();
        let res = rt.block_on(root.prepare());
        trace_prepare(root, res.is_ok(), start.elapsed());
        res.map_err(ExecError::from)
    }

    /// Prepare, then drain up to `max_rows` records.
    pub fn run(&self, root: &mut dyn RecordIterator) -> Result<RunSummary, ExecError> {
        let start = Instant::now();
        self.prepare(root)?;
        let prepare_ms = start.elapsed().as_millis();
        let drain_start = Instant::now();

        let mut records = Vec::new();
        let mut exhausted = false;
        loop {
            if self.cfg.max_rows.is_some_and(|max| records.len() >= max) {
                break;
            }
            if !root.next()? {
                exhausted = true;
                break;
            }
            records.push(root.value()?.clone());
        }

        let cookie = (!records.is_empty() && !exhausted).then(|| root.cookie());
        let timings = PhaseTimings {
            prepare_ms,
            drain_ms: drain_start.elapsed().as_millis(),
            rows: records.len(),
        };
        trace_run(root, &timings, exhausted);
        Ok(RunSummary {
            records,
            cookie,
            exhausted,
            elapsed_ms: start.elapsed().as_millis(),
            timings,
        })
    }

    /// Drain an already prepared tree.
    pub fn collect(root: &mut dyn RecordIterator) -> Result<Vec<Record>, ExecError> {
        let mut out = Vec::new();
        while root.next()? {
            out.push(root.value()?.clone());
        }
        Ok(out)
    }
}
