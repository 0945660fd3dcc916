//! SHA256 hashing helpers.

use sha2::{Digest, Sha256};

/// A 256-bit digest, read as a big-endian unsigned integer when compared.
pub type Hash256 = [u8; 32];

/// Single SHA256 hash.
///
/// Header digests, transaction commitments and test fixtures all go through
/// this one function.
#[inline]
pub fn sha256(data: &[u8]) -> Hash256 {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Render a digest as lowercase hex, most significant byte first.
pub fn hash_to_hex(hash: &Hash256) -> String {
    hex::encode(hash)
}

/// Count leading zero bits of a digest read as a big-endian integer.
pub fn leading_zero_bits(hash: &Hash256) -> u32 {
    let mut zeros = 0u32;
    for byte in hash.iter() {
        if *byte == 0 {
            zeros += 8;
        } else {
            zeros += byte.leading_zeros();
            break;
        }
    }
    zeros
}
