//! Nonce search.
//!
//! Candidates run from 0 up to, but not including, the configured
//! `max_nonce`. Each one is assembled into the header bytes, hashed with
//! SHA256 and compared against the target; the first digest strictly below
//! the target wins. Running out of candidates is reported as
//! [`PowError::Exhausted`], never as a solution.
//!
//! With more than one worker the nonce space is split by stride: worker `w`
//! of `W` tries `w, w + W, w + 2W, ...`. Workers share only a winner flag and
//! an attempt counter. The first worker to claim the flag supplies the
//! result; the rest stop at their next iteration.

use core::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use serde::{Deserialize, Serialize};

use crate::config::MinerConfig;
use crate::difficulty::Target;
use crate::error::{PowError, Result};
use crate::hash::{hash_to_hex, sha256, Hash256};
use crate::header::{HeaderFields, HeaderPrefix};
use crate::observer::{MiningObserver, NoopObserver};
use crate::pow::ProofOfWork;

/// A nonce whose header digest meets the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// The winning nonce.
    pub nonce: i64,
    /// Digest of the header with that nonce.
    pub hash: Hash256,
    /// Hashes computed across all workers, including the winning one.
    pub attempts: u64,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nonce {} hash {}", self.nonce, hash_to_hex(&self.hash))
    }
}

/// State shared by the workers of one search.
#[derive(Default)]
struct SearchState {
    found: AtomicBool,
    attempts: AtomicU64,
}

/// Runs the nonce search for a proof of work.
#[derive(Debug, Clone)]
pub struct Miner<O = NoopObserver> {
    config: MinerConfig,
    observer: O,
}

impl Miner<NoopObserver> {
    /// Create a silent miner with the given search parameters.
    pub fn new(config: MinerConfig) -> Self {
        Miner {
            config,
            observer: NoopObserver,
        }
    }
}

impl Default for Miner<NoopObserver> {
    fn default() -> Self {
        Miner::new(MinerConfig::default())
    }
}

impl<O: MiningObserver> Miner<O> {
    /// Replace the progress observer.
    pub fn with_observer<P: MiningObserver>(self, observer: P) -> Miner<P> {
        Miner {
            config: self.config,
            observer,
        }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Search for a nonce that makes the header digest meet the target.
    pub fn mine<H>(&self, pow: &ProofOfWork<'_, H>) -> Result<Solution>
    where
        H: HeaderFields + ?Sized,
    {
        self.config.validate()?;

        let max_nonce = self.config.max_nonce;
        let workers = self.config.workers;
        let target = *pow.target();
        let prefix = pow.prefix();
        let state = SearchState::default();

        tracing::debug!(
            difficulty = pow.difficulty(),
            max_nonce,
            workers,
            "starting nonce search"
        );

        let stride = self.thread_count();
        let winner = if stride == 1 {
            self.search(prefix, target, 0, 1, max_nonce, &state)
        } else {
            self.search_parallel(&prefix, target, stride, max_nonce, &state)
        };

        let attempts = state.attempts.load(Ordering::Acquire);
        match winner {
            Some((nonce, hash)) => {
                let solution = Solution { nonce, hash, attempts };
                self.observer.on_solution(&solution);
                tracing::info!(
                    nonce,
                    attempts,
                    hash = %hash_to_hex(&hash),
                    "found proof of work"
                );
                Ok(solution)
            }
            None => {
                self.observer.on_exhausted(max_nonce);
                tracing::warn!(max_nonce, attempts, "nonce space exhausted");
                Err(PowError::Exhausted { max_nonce })
            }
        }
    }

    /// Threads to spawn: the configured workers, but never more than there
    /// are candidate nonces, and at least one.
    fn thread_count(&self) -> i64 {
        let workers = i64::try_from(self.config.workers).unwrap_or(i64::MAX);
        workers.min(self.config.max_nonce).max(1)
    }

    fn search_parallel(
        &self,
        prefix: &HeaderPrefix,
        target: Target,
        stride: i64,
        max_nonce: i64,
        state: &SearchState,
    ) -> Option<(i64, Hash256)> {
        thread::scope(|scope| {
            let handles: Vec<_> = (0..stride)
                .map(|start| {
                    let prefix = prefix.clone();
                    scope.spawn(move || {
                        self.search(prefix, target, start, stride, max_nonce, state)
                    })
                })
                .collect();

            let mut winner = None;
            for handle in handles {
                match handle.join() {
                    Ok(Some(found)) => winner = Some(found),
                    Ok(None) => {}
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            winner
        })
    }

    /// Try `start, start + stride, ...` below `max_nonce` until a hash meets
    /// the target or another worker claims the win.
    fn search(
        &self,
        mut prefix: HeaderPrefix,
        target: Target,
        start: i64,
        stride: i64,
        max_nonce: i64,
        state: &SearchState,
    ) -> Option<(i64, Hash256)> {
        let mut nonce = start;
        let mut attempts = 0u64;

        let result = loop {
            if nonce >= max_nonce || state.found.load(Ordering::Relaxed) {
                break None;
            }

            let hash = sha256(prefix.with_nonce(nonce));
            attempts += 1;
            self.observer.on_attempt(nonce, &hash);

            if target.is_met_by(&hash) {
                // Only one worker may claim the win.
                let claimed = state
                    .found
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                break claimed.then_some((nonce, hash));
            }

            nonce = match nonce.checked_add(stride) {
                Some(next) => next,
                None => break None,
            };
        };

        state.attempts.fetch_add(attempts, Ordering::AcqRel);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::BlockHeader;
    use std::sync::Mutex;

    /// Records every attempted nonce.
    #[derive(Default)]
    struct Recorder {
        nonces: Mutex<Vec<i64>>,
        solutions: AtomicU64,
        exhausted: AtomicU64,
    }

    impl MiningObserver for Recorder {
        fn on_attempt(&self, nonce: i64, _hash: &Hash256) {
            self.nonces.lock().unwrap().push(nonce);
        }

        fn on_solution(&self, _solution: &Solution) {
            self.solutions.fetch_add(1, Ordering::Relaxed);
        }

        fn on_exhausted(&self, _max_nonce: i64) {
            self.exhausted.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn header() -> BlockHeader {
        BlockHeader::new(vec![0x12; 32], vec![b"alice->bob".to_vec()], 1_700_000_000)
    }

    #[test]
    fn test_single_worker_finds_lowest_nonce() {
        let header = header();
        let pow = ProofOfWork::new(&header, 5).unwrap();
        let solution = Miner::default().mine(&pow).unwrap();

        for nonce in 0..solution.nonce {
            assert!(!pow.target().is_met_by(&pow.hash_with_nonce(nonce)));
        }
        assert!(pow.target().is_met_by(&solution.hash));
        assert_eq!(solution.attempts, solution.nonce as u64 + 1);
    }

    #[test]
    fn test_difficulty_zero_returns_nonce_zero() {
        let header = header();
        let pow = ProofOfWork::new(&header, 0).unwrap();
        let solution = Miner::default().mine(&pow).unwrap();

        assert_eq!(solution.nonce, 0);
        assert_eq!(solution.attempts, 1);
        assert_eq!(solution.hash, pow.hash_with_nonce(0));
    }

    #[test]
    fn test_zero_bound_is_exhausted() {
        let header = header();
        let pow = ProofOfWork::new(&header, 0).unwrap();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(0));

        assert_eq!(miner.mine(&pow), Err(PowError::Exhausted { max_nonce: 0 }));
    }

    #[test]
    fn test_exhaustion_is_not_a_solution() {
        let header = header();
        // With a bound of 8, 255 leading zero bits will not turn up.
        let pow = ProofOfWork::new(&header, 255).unwrap();
        let recorder = Recorder::default();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(8)).with_observer(&recorder);

        assert_eq!(miner.mine(&pow), Err(PowError::Exhausted { max_nonce: 8 }));
        assert_eq!(*recorder.nonces.lock().unwrap(), (0..8).collect::<Vec<_>>());
        assert_eq!(recorder.exhausted.load(Ordering::Relaxed), 1);
        assert_eq!(recorder.solutions.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_bound_of_one_only_tries_nonce_zero() {
        let header = header();
        // Pick the lowest difficulty where nonce 0 fails.
        let difficulty = (1..256)
            .find(|d| {
                let pow = ProofOfWork::new(&header, *d).unwrap();
                !pow.target().is_met_by(&pow.hash_with_nonce(0))
            })
            .unwrap();
        let pow = ProofOfWork::new(&header, difficulty).unwrap();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(1));

        assert_eq!(miner.mine(&pow), Err(PowError::Exhausted { max_nonce: 1 }));
    }

    #[test]
    fn test_observer_sees_every_attempt() {
        let header = header();
        let pow = ProofOfWork::new(&header, 4).unwrap();
        let recorder = Recorder::default();
        let solution = Miner::default().with_observer(&recorder).mine(&pow).unwrap();

        let nonces = recorder.nonces.lock().unwrap();
        assert_eq!(*nonces, (0..=solution.nonce).collect::<Vec<_>>());
        assert_eq!(recorder.solutions.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_parallel_search_finds_valid_nonce() {
        let mut header = header();
        let solution = {
            let pow = ProofOfWork::new(&header, 8).unwrap();
            Miner::new(MinerConfig::new().with_workers(4)).mine(&pow).unwrap()
        };

        header.apply(&solution);
        let pow = ProofOfWork::new(&header, 8).unwrap();
        assert!(pow.validate());
        assert_eq!(pow.hash_with_nonce(solution.nonce), solution.hash);
        assert!(solution.attempts >= 1);
    }

    #[test]
    fn test_parallel_search_partitions_nonces() {
        let header = header();
        let pow = ProofOfWork::new(&header, 255).unwrap();
        let recorder = Recorder::default();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(10).with_workers(3))
            .with_observer(&recorder);

        assert_eq!(miner.mine(&pow), Err(PowError::Exhausted { max_nonce: 10 }));

        let mut nonces = recorder.nonces.lock().unwrap().clone();
        nonces.sort_unstable();
        assert_eq!(nonces, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_more_workers_than_nonces() {
        let header = header();
        let pow = ProofOfWork::new(&header, 0).unwrap();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(2).with_workers(8));

        let solution = miner.mine(&pow).unwrap();
        assert!(solution.nonce == 0 || solution.nonce == 1);
    }

    #[test]
    fn test_thread_count_capped_by_nonce_space() {
        let miner = |max_nonce, workers| {
            Miner::new(MinerConfig::new().with_max_nonce(max_nonce).with_workers(workers))
        };

        assert_eq!(miner(2, 8).thread_count(), 2);
        assert_eq!(miner(0, 8).thread_count(), 1);
        assert_eq!(miner(1 << 20, 4).thread_count(), 4);
        assert_eq!(miner(i64::MAX, 1).thread_count(), 1);
    }

    #[test]
    fn test_excess_workers_still_cover_every_nonce() {
        let header = header();
        let pow = ProofOfWork::new(&header, 255).unwrap();
        let recorder = Recorder::default();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(3).with_workers(64))
            .with_observer(&recorder);

        assert_eq!(miner.mine(&pow), Err(PowError::Exhausted { max_nonce: 3 }));

        let mut nonces = recorder.nonces.lock().unwrap().clone();
        nonces.sort_unstable();
        assert_eq!(nonces, vec![0, 1, 2]);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let header = header();
        let pow = ProofOfWork::new(&header, 1).unwrap();
        let miner = Miner::new(MinerConfig::new().with_workers(0));

        assert!(matches!(miner.mine(&pow), Err(PowError::InvalidConfig(_))));
    }

    #[test]
    fn test_nonce_near_max_does_not_overflow() {
        let header = header();
        let pow = ProofOfWork::new(&header, 255).unwrap();
        let recorder = Recorder::default();
        let miner = Miner::new(MinerConfig::new().with_max_nonce(i64::MAX).with_workers(2))
            .with_observer(&recorder);

        // Drive one worker's stride past i64::MAX directly.
        let state = SearchState::default();
        let found = miner.search(pow.prefix(), *pow.target(), i64::MAX - 3, 2, i64::MAX, &state);

        assert_eq!(found, None);
        assert_eq!(state.attempts.load(Ordering::Relaxed), 2);
        assert_eq!(*recorder.nonces.lock().unwrap(), vec![i64::MAX - 3, i64::MAX - 1]);
    }

    #[test]
    fn test_solution_display() {
        let solution = Solution { nonce: 3, hash: [0xAB; 32], attempts: 4 };
        assert_eq!(solution.to_string(), format!("nonce 3 hash {}", "ab".repeat(32)));
    }
}
