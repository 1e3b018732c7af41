//! Merkle aggregation of transaction hashes.
//!
//! Reduces an ordered list of leaves to a single root by pairing
//! adjacent hashes left to right with sha256d, duplicating an odd
//! leftover against itself. A single leaf is its own root. The reduction
//! runs level by level over a flat vector, so large transaction counts
//! never risk recursion depth.

use crate::error::{LedgerError, Result};
use crate::utils::sha256d;

/// Hash a left/right pair: sha256d(left || right).
fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    sha256d(&combined)
}

/// Compute the merkle root of an ordered, non-empty list of hashes.
pub fn merkle_root(leaves: &[[u8; 32]]) -> Result<[u8; 32]> {
    if leaves.is_empty() {
        return Err(LedgerError::InvalidBlock(
            "Cannot compute merkle root of an empty leaf list".to_string(),
        ));
    }

    let mut current_level = leaves.to_vec();
    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));
        for pair in current_level.chunks(2) {
            let left = &pair[0];
            // Odd leftover pairs with itself
            let right = pair.get(1).unwrap_or(left);
            next_level.push(hash_pair(left, right));
        }
        current_level = next_level;
    }

    Ok(current_level[0])
}
