//! Proof-of-work mining and validation for toy blockchain block headers.
//!
//! This crate provides pure Rust implementations of:
//! - Difficulty to 256-bit target conversion and comparison
//! - Deterministic header assembly (prev hash, transactions hash, timestamp,
//!   difficulty, nonce)
//! - Bounded nonce search, single-threaded or split across workers
//! - One-hash validation of a committed nonce
//!
//! # Example
//!
//! ```rust
//! use pow_core::{BlockHeader, Miner, MinerConfig, ProofOfWork};
//!
//! let mut header = BlockHeader::new(Vec::new(), Vec::new(), 0);
//!
//! let solution = {
//!     let pow = ProofOfWork::new(&header, 4).unwrap();
//!     Miner::new(MinerConfig::new().with_max_nonce(1 << 20)).mine(&pow).unwrap()
//! };
//! header.apply(&solution);
//!
//! assert!(ProofOfWork::new(&header, 4).unwrap().validate());
//! ```

pub mod commitment;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod header;
pub mod miner;
pub mod observer;
pub mod pow;

pub use commitment::hash_transactions;
pub use config::{MinerConfig, PowConfig};
pub use difficulty::{expected_hashes, hash_below_target, Target};
pub use error::{PowError, Result};
pub use hash::{sha256, Hash256};
pub use header::{assemble, int_to_be_bytes, BlockHeader, HeaderFields};
pub use miner::{Miner, Solution};
pub use observer::{FnObserver, MiningObserver, NoopObserver, TracingObserver};
pub use pow::ProofOfWork;
