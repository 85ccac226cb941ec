//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Optional seed for deterministic reservoir sampling.
    pub seed: Option<u64>,

    /// Whether concatenation drops ids it has already emitted.
    pub concat_dedup: bool,

    /// Upper bound on records drained by a single run. `None` drains everything.
    pub max_rows: Option<usize>,

    /// Worker threads for the prepare phase. 1 selects a current-thread runtime.
    pub worker_threads: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            concat_dedup: true,
            max_rows: None,
            worker_threads: 1,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `STRATA_SEED`: random seed
    /// - `STRATA_CONCAT_DEDUP`: `true`/`false`
    /// - `STRATA_MAX_ROWS`: row cap per run
    /// - `STRATA_WORKER_THREADS`: prepare-phase worker threads
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("STRATA_SEED") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.seed = Some(v);
            }
        }

        if let Ok(s) = std::env::var("STRATA_CONCAT_DEDUP") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.concat_dedup = v;
            }
        }

        if let Ok(s) = std::env::var("STRATA_MAX_ROWS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.max_rows = Some(v);
            }
        }

        if let Ok(s) = std::env::var("STRATA_WORKER_THREADS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.worker_threads = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::Config("worker_threads must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.concat_dedup);
        assert_eq!(cfg.worker_threads, 1);
    }

    #[test]
    fn zero_workers_rejected() {
        let cfg = EngineConfig {
            worker_threads: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert!(cfg.concat_dedup);
        assert_eq!(cfg.max_rows, None);
    }
}
