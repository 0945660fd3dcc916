//! Transactions commitment for block headers.

use crate::hash::{sha256, Hash256};

/// Commit to a block's transactions.
///
/// The commitment is the SHA256 of all transaction IDs concatenated in block
/// order. A block with no transactions commits to the hash of empty input.
pub fn hash_transactions<T: AsRef<[u8]>>(ids: &[T]) -> Hash256 {
    let total = ids.iter().map(|id| id.as_ref().len()).sum();
    let mut joined = Vec::with_capacity(total);
    for id in ids {
        joined.extend_from_slice(id.as_ref());
    }
    sha256(&joined)
}
