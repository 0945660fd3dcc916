//! Error types for proof-of-work construction and search.

use thiserror::Error;

/// Errors that can occur while building or running a proof of work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    /// Difficulty outside `[0, 256)`.
    #[error("invalid difficulty {0}: must be less than 256")]
    InvalidDifficulty(u32),

    /// Every candidate nonce below the search bound was tried without success.
    #[error("nonce space exhausted: no nonce below {max_nonce} meets the target")]
    Exhausted { max_nonce: i64 },

    /// Rejected miner or proof-of-work configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PowError>;
