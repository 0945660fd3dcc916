//! Difficulty to target conversion and target comparison.

use core::cmp::Ordering;
use core::fmt;

use crate::error::{PowError, Result};
use crate::hash::Hash256;

/// Number of bits in a digest; difficulty must stay strictly below this.
pub const HASH_BITS: u32 = 256;

/// A proof-of-work threshold equal to `2^(256 - difficulty)`.
///
/// A digest meets the target when, read as a big-endian unsigned integer, it
/// is strictly less than the target. At difficulty 0 the target is `2^256`,
/// which does not fit in 32 bytes; every digest meets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    difficulty: u32,
    /// Big-endian value, `None` for `2^256`.
    bytes: Option<[u8; 32]>,
}

impl Target {
    /// Derive the target for `difficulty` leading zero bits.
    pub fn from_difficulty(difficulty: u32) -> Result<Self> {
        if difficulty >= HASH_BITS {
            return Err(PowError::InvalidDifficulty(difficulty));
        }
        let exponent = HASH_BITS - difficulty;
        let bytes = if exponent == HASH_BITS {
            None
        } else {
            let mut target = [0u8; 32];
            target[31 - (exponent / 8) as usize] = 1u8 << (exponent % 8);
            Some(target)
        };
        Ok(Target { difficulty, bytes })
    }

    /// The difficulty this target was derived from.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// The power of two this target equals, in `1..=256`.
    pub fn exponent(&self) -> u32 {
        HASH_BITS - self.difficulty
    }

    /// Check whether `hash < target`.
    #[inline]
    pub fn is_met_by(&self, hash: &Hash256) -> bool {
        match &self.bytes {
            Some(target) => hash_below_target(hash, target),
            None => true,
        }
    }

    /// The target as a 32-byte big-endian number.
    ///
    /// Returns `None` at difficulty 0, where the target is `2^256`.
    pub fn to_be_bytes(&self) -> Option<[u8; 32]> {
        self.bytes
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    /// Orders by numeric value: a higher difficulty is a smaller target.
    fn cmp(&self, other: &Self) -> Ordering {
        self.exponent().cmp(&other.exponent())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_be_bytes() {
            Some(bytes) => write!(f, "{}", hex::encode(bytes)),
            None => write!(f, "2^256"),
        }
    }
}

/// Check if a hash is below an arbitrary 32-byte target.
///
/// Both are treated as 256-bit big-endian numbers; equality does not pass.
#[inline]
pub fn hash_below_target(hash: &Hash256, target: &[u8; 32]) -> bool {
    for i in 0..32 {
        if hash[i] < target[i] {
            return true;
        }
        if hash[i] > target[i] {
            return false;
        }
    }
    false
}

/// Average number of hashes needed to meet a target of the given difficulty.
///
/// Each attempt succeeds with probability `2^-difficulty`, so the search
/// length is geometric with mean `2^difficulty`.
pub fn expected_hashes(difficulty: u32) -> f64 {
    2f64.powi(difficulty as i32)
}
