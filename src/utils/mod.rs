//! Utility functions and helpers
//!
//! Cryptographic digests and wire/hex encoding helpers used throughout
//! the ledger engine.

pub mod crypto;
pub mod encoding;

pub use crypto::{sha256_digest, sha256d};
pub use encoding::{
    decode_varint, display_hex_to_hash, encode_varint, from_hex, hash_to_display_hex, to_hex,
    ByteReader,
};

use crate::error::{LedgerError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds, as the u32 used in block headers.
pub fn current_timestamp() -> Result<u32> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LedgerError::Io(format!("System time error: {e}")))?
        .as_secs();
    u32::try_from(seconds).map_err(|_| LedgerError::Io("Timestamp overflow".to_string()))
}
