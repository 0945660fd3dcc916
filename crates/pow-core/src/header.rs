//! Block header fields and their deterministic byte assembly.
//!
//! The hashed preimage is the concatenation, with no separators, of:
//!
//! | field               | encoding              |
//! |---------------------|-----------------------|
//! | previous block hash | raw bytes             |
//! | transactions hash   | raw bytes             |
//! | timestamp           | 8 bytes, big-endian   |
//! | difficulty          | 8 bytes, big-endian   |
//! | nonce               | 8 bytes, big-endian   |

use serde::{Deserialize, Serialize};

use crate::commitment::hash_transactions;
use crate::miner::Solution;

/// Width of each integer field in the assembled header.
pub const INT_FIELD_SIZE: usize = 8;

/// Header fields the proof of work reads from a block.
///
/// Blocks own their headers; the proof of work only borrows them.
pub trait HeaderFields {
    /// Hash of the previous block.
    fn prev_hash(&self) -> &[u8];
    /// Commitment over all transactions in the block.
    fn transactions_hash(&self) -> Vec<u8>;
    /// Block timestamp (Unix time).
    fn timestamp(&self) -> i64;
    /// Nonce committed in the header.
    fn nonce(&self) -> i64;
}

/// Encode a signed 64-bit integer as 8 big-endian bytes.
#[inline]
pub fn int_to_be_bytes(value: i64) -> [u8; INT_FIELD_SIZE] {
    value.to_be_bytes()
}

/// Assemble the bytes hashed for proof of work.
pub fn assemble(
    prev_hash: &[u8],
    transactions_hash: &[u8],
    timestamp: i64,
    difficulty: u32,
    nonce: i64,
) -> Vec<u8> {
    let mut data =
        Vec::with_capacity(prev_hash.len() + transactions_hash.len() + 3 * INT_FIELD_SIZE);
    data.extend_from_slice(prev_hash);
    data.extend_from_slice(transactions_hash);
    data.extend_from_slice(&int_to_be_bytes(timestamp));
    data.extend_from_slice(&int_to_be_bytes(difficulty as i64));
    data.extend_from_slice(&int_to_be_bytes(nonce));
    data
}

/// Header bytes with the trailing nonce slot left open.
///
/// Used for efficient mining where we only change the nonce: the
/// transactions hash and fixed fields are assembled once per search.
#[derive(Debug, Clone)]
pub struct HeaderPrefix {
    buf: Vec<u8>,
}

impl HeaderPrefix {
    /// Assemble everything except the nonce.
    pub fn new<H: HeaderFields + ?Sized>(header: &H, difficulty: u32) -> Self {
        let buf = assemble(
            header.prev_hash(),
            &header.transactions_hash(),
            header.timestamp(),
            difficulty,
            0,
        );
        HeaderPrefix { buf }
    }

    /// Full header bytes for `nonce`. Only the last 8 bytes are rewritten.
    #[inline]
    pub fn with_nonce(&mut self, nonce: i64) -> &[u8] {
        let start = self.buf.len() - INT_FIELD_SIZE;
        self.buf[start..].copy_from_slice(&int_to_be_bytes(nonce));
        &self.buf
    }

    /// Total length of the assembled header.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// A minimal block header carrying the fields the proof of work consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Hash of the previous block; empty for a genesis block.
    pub prev_block_hash: Vec<u8>,
    /// IDs of the transactions included in the block.
    pub transaction_ids: Vec<Vec<u8>>,
    /// Block timestamp (Unix time).
    pub timestamp: i64,
    /// Nonce for proof of work.
    pub nonce: i64,
}

impl BlockHeader {
    /// Create a new block header with a zero nonce.
    pub fn new(prev_block_hash: Vec<u8>, transaction_ids: Vec<Vec<u8>>, timestamp: i64) -> Self {
        BlockHeader {
            prev_block_hash,
            transaction_ids,
            timestamp,
            nonce: 0,
        }
    }

    /// Store a mined nonce in the header.
    pub fn apply(&mut self, solution: &Solution) {
        self.nonce = solution.nonce;
    }
}

impl HeaderFields for BlockHeader {
    fn prev_hash(&self) -> &[u8] {
        &self.prev_block_hash
    }

    fn transactions_hash(&self) -> Vec<u8> {
        hash_transactions(&self.transaction_ids).to_vec()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn nonce(&self) -> i64 {
        self.nonce
    }
}
