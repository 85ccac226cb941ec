use futures::future::BoxFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use strata_core::config::EngineConfig;
use strata_core::error::Result;
use strata_core::item::Record;

use crate::sort::cmp_records;
use crate::traits::{delegate_state, BoxedIterator, IteratorKind, Phase, RecordIterator};
use crate::wrapped::WrappedIterator;

/// Rejected records are skipped in batches of at most this many so that
/// exhaustion of the child is noticed.
const SKIP_BATCH: usize = 1024;

/// Uniform sample of `count` records from its child (reservoir sampling).
///
/// The sample is emitted largest first by `(value, ts, id)`.
pub struct RandomIterator {
    base: WrappedIterator,
    count: usize,
    rng: StdRng,
    phase: Phase,
    samples: Vec<Record>,
    current: Option<Record>,
}

impl RandomIterator {
    pub fn new(inner: BoxedIterator, count: usize) -> Self {
        Self::with_rng(inner, count, StdRng::from_entropy())
    }

    /// Deterministic sampling.
    pub fn with_seed(inner: BoxedIterator, count: usize, seed: u64) -> Self {
        Self::with_rng(inner, count, StdRng::seed_from_u64(seed))
    }

    /// Seeded from `config.seed` when set.
    pub fn with_config(inner: BoxedIterator, count: usize, config: &EngineConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(inner, count, seed),
            None => Self::new(inner, count),
        }
    }

    fn with_rng(inner: BoxedIterator, count: usize, rng: StdRng) -> Self {
        Self {
            base: WrappedIterator::new(inner),
            count,
            rng,
            phase: Phase::NotStarted,
            samples: Vec::new(),
            current: None,
        }
    }

    fn load(&mut self) -> Result<()> {
        let k = self.count;
        let inner = self.base.inner_mut()?;
        let mut samples = Vec::with_capacity(k);
        while samples.len() < k && inner.next()? {
            samples.push(inner.current().clone());
        }

        if k > 0 && samples.len() == k {
            // `seen` counts records drawn for so far, `skip` the rejected
            // ones not yet pulled from the child.
            let mut seen = k;
            let mut skip = 0usize;
            loop {
                let x = self.rng.gen_range(0..=seen);
                if x < k {
                    if !inner.skip(skip + 1)? {
                        break;
                    }
                    skip = 0;
                    samples[x] = inner.current().clone();
                } else {
                    skip += 1;
                    if skip >= SKIP_BATCH {
                        if !inner.skip(skip)? {
                            break;
                        }
                        skip = 0;
                    }
                }
                seen += 1;
            }
        }

        debug!(requested = k, sampled = samples.len(), "random sample loaded");
        samples.sort_by(cmp_records);
        self.samples = samples;
        Ok(())
    }
}

impl RecordIterator for RandomIterator {
    fn name(&self) -> &'static str {
        "random"
    }

    fn kind(&self) -> IteratorKind {
        IteratorKind::Wrapped
    }

    delegate_state!(base);

    fn prepare(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.base.prepare_inner())
    }

    fn do_next(&mut self) -> Result<bool> {
        if self.done() {
            return Ok(false);
        }
        if self.phase == Phase::NotStarted {
            self.phase = Phase::Active;
            self.load()?;
        }
        self.current = self.samples.pop();
        if self.current.is_none() {
            self.base.state_mut().set_done();
            return Ok(false);
        }
        Ok(true)
    }

    fn current(&self) -> &Record {
        self.current.as_ref().unwrap_or_else(|| Record::empty_ref())
    }

    fn num_buffered(&self) -> Option<usize> {
        match self.phase {
            Phase::NotStarted => None,
            Phase::Active => Some(self.samples.len()),
        }
    }

    fn child_count(&self) -> usize {
        1
    }
}
