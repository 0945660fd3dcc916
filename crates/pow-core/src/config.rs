//! Proof-of-work and miner configuration.
//!
//! Difficulty and search bound are plain values rather than constants so
//! tests and tools can run low-difficulty, tightly bounded searches.

use serde::{Deserialize, Serialize};

use crate::difficulty::Target;
use crate::error::{PowError, Result};

/// Leading zero bits required when nothing else is configured.
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Exclusive upper bound on candidate nonces when nothing else is configured.
pub const DEFAULT_MAX_NONCE: i64 = i64::MAX;

/// Upper limit on search threads.
pub const MAX_WORKERS: usize = 1024;

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}
fn default_max_nonce() -> i64 {
    DEFAULT_MAX_NONCE
}
fn default_workers() -> usize {
    1
}

/// Search parameters for the miner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Candidates are `0..max_nonce`; reaching it without success is exhaustion.
    #[serde(default = "default_max_nonce")]
    pub max_nonce: i64,

    /// Number of threads sharing the nonce space.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            max_nonce: default_max_nonce(),
            workers: default_workers(),
        }
    }
}

impl MinerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_nonce(mut self, max_nonce: i64) -> Self {
        self.max_nonce = max_nonce;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Reject settings the miner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PowError::InvalidConfig("workers must be at least 1".into()));
        }
        if self.workers > MAX_WORKERS {
            return Err(PowError::InvalidConfig(format!(
                "workers must be at most {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if self.max_nonce < 0 {
            return Err(PowError::InvalidConfig(format!(
                "max_nonce must not be negative, got {}",
                self.max_nonce
            )));
        }
        Ok(())
    }
}

/// Difficulty plus search parameters, as loaded from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowConfig {
    /// Required leading zero bits, in `[0, 256)`.
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,

    #[serde(flatten)]
    pub miner: MinerConfig,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            miner: MinerConfig::default(),
        }
    }
}

impl PowConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PowConfig =
            serde_json::from_str(json).map_err(|e| PowError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the difficulty range and miner settings.
    pub fn validate(&self) -> Result<()> {
        Target::from_difficulty(self.difficulty)?;
        self.miner.validate()
    }
}
