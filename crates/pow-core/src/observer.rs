//! Progress reporting hooks for the nonce search.

use crate::hash::{hash_to_hex, leading_zero_bits, Hash256};
use crate::miner::Solution;

/// Receives progress events from a running search.
///
/// Every method defaults to doing nothing. With parallel workers the
/// callbacks arrive concurrently and out of nonce order.
pub trait MiningObserver: Send + Sync {
    /// Called after each candidate nonce is hashed.
    fn on_attempt(&self, _nonce: i64, _hash: &Hash256) {}

    /// Called once when the accepted solution is known.
    fn on_solution(&self, _solution: &Solution) {}

    /// Called when the search bound is reached without success.
    fn on_exhausted(&self, _max_nonce: i64) {}
}

impl<T: MiningObserver + ?Sized> MiningObserver for &T {
    fn on_attempt(&self, nonce: i64, hash: &Hash256) {
        (**self).on_attempt(nonce, hash)
    }

    fn on_solution(&self, solution: &Solution) {
        (**self).on_solution(solution)
    }

    fn on_exhausted(&self, max_nonce: i64) {
        (**self).on_exhausted(max_nonce)
    }
}

/// Observer that ignores every event. The miner's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl MiningObserver for NoopObserver {}

/// Logs sampled attempts and results through `tracing`.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    every: u64,
}

impl TracingObserver {
    /// Log one attempt out of every `every` nonces (at least 1).
    pub fn new(every: u64) -> Self {
        TracingObserver { every: every.max(1) }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        TracingObserver::new(1 << 16)
    }
}

impl MiningObserver for TracingObserver {
    fn on_attempt(&self, nonce: i64, hash: &Hash256) {
        if nonce as u64 % self.every == 0 {
            tracing::trace!(
                nonce,
                zeros = leading_zero_bits(hash),
                hash = %hash_to_hex(hash),
                "mining attempt"
            );
        }
    }

    fn on_solution(&self, solution: &Solution) {
        tracing::debug!(
            nonce = solution.nonce,
            attempts = solution.attempts,
            hash = %hash_to_hex(&solution.hash),
            "observer saw solution"
        );
    }

    fn on_exhausted(&self, max_nonce: i64) {
        tracing::debug!(max_nonce, "observer saw exhausted search");
    }
}

/// Adapts a closure into an attempt observer.
pub struct FnObserver<F>(pub F);

impl<F> MiningObserver for FnObserver<F>
where
    F: Fn(i64, &Hash256) + Send + Sync,
{
    fn on_attempt(&self, nonce: i64, hash: &Hash256) {
        (self.0)(nonce, hash)
    }
}
