//! Error handling for the ledger engine
//!
//! One crate-wide error type covering both structural decode failures
//! and semantic validation failures, kept as distinct variants so callers
//! can tell a malformed record apart from a hash mismatch.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for ledger operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// Malformed binary data: bad varint, out-of-range compact bits,
    /// wrong payload length, truncated wire encoding
    Format(String),
    /// A structured record is missing a field or carries the wrong type;
    /// names the first offending field
    Schema { field: String, reason: String },
    /// A recomputed hash disagrees with a declared/expected hash
    Integrity(String),
    /// Serialization/deserialization errors at the JSON boundary
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Invalid address format
    InvalidAddress(String),
    /// Block validation errors
    InvalidBlock(String),
    /// Mining errors (exceeded retry budget)
    Mining(String),
    /// Ledger store errors, including append conflicts
    Store(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Format(msg) => write!(f, "Format error: {msg}"),
            LedgerError::Schema { field, reason } => {
                write!(f, "Schema error in field '{field}': {reason}")
            }
            LedgerError::Integrity(msg) => write!(f, "Integrity error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            LedgerError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            LedgerError::Mining(msg) => write!(f, "Mining error: {msg}"),
            LedgerError::Store(msg) => write!(f, "Store error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
