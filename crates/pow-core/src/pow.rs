//! Proof-of-work instances: a borrowed header bound to its target.

use crate::difficulty::Target;
use crate::error::Result;
use crate::hash::{sha256, Hash256};
use crate::header::{assemble, HeaderFields, HeaderPrefix};
use crate::miner::{Miner, Solution};

/// A header snapshot paired with the target derived from a difficulty.
///
/// Built once per mining or validation attempt and never mutated. The header
/// is borrowed, so it cannot change underneath a running search.
#[derive(Debug)]
pub struct ProofOfWork<'a, H: ?Sized> {
    header: &'a H,
    target: Target,
}

impl<'a, H: HeaderFields + ?Sized> ProofOfWork<'a, H> {
    /// Bind `header` to the target for `difficulty`.
    ///
    /// Fails with `InvalidDifficulty` unless `difficulty < 256`.
    pub fn new(header: &'a H, difficulty: u32) -> Result<Self> {
        let target = Target::from_difficulty(difficulty)?;
        Ok(ProofOfWork { header, target })
    }

    pub fn header(&self) -> &'a H {
        self.header
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn difficulty(&self) -> u32 {
        self.target.difficulty()
    }

    /// Bytes hashed for a candidate nonce.
    pub fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        assemble(
            self.header.prev_hash(),
            &self.header.transactions_hash(),
            self.header.timestamp(),
            self.difficulty(),
            nonce,
        )
    }

    /// Digest of the header with `nonce` in place of the stored one.
    pub fn hash_with_nonce(&self, nonce: i64) -> Hash256 {
        sha256(&self.prepare_data(nonce))
    }

    /// Header bytes with the nonce slot open, for repeated hashing.
    pub(crate) fn prefix(&self) -> HeaderPrefix {
        HeaderPrefix::new(self.header, self.difficulty())
    }

    /// Check the nonce already stored in the header. One hash, no search.
    pub fn validate(&self) -> bool {
        let hash = self.hash_with_nonce(self.header.nonce());
        self.target.is_met_by(&hash)
    }

    /// Search with the default miner: one worker, bound `i64::MAX`, no observer.
    pub fn run(&self) -> Result<Solution> {
        Miner::default().mine(self)
    }
}
