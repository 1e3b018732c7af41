//! # Forgechain
//!
//! A minimal proof-of-work ledger engine: canonical binary encoding for
//! transactions and blocks, double-SHA256 content hashing, merkle
//! aggregation, a compact-bits difficulty schedule with periodic
//! retargeting, and a nonce-search miner. Blocks persist as JSON records
//! behind a pluggable store.
//!
//! ## Layout
//! - `core/`: transactions, blocks, merkle, difficulty, mining, the ledger
//! - `wallet/`: base58check addresses and the P2PKH script pattern
//! - `storage/`: the `LedgerStore` trait and its JSON / in-memory stores
//! - `config/`: chain parameters (retarget cadence, initial bits, reward)
//! - `utils/`: sha256d and the varint/hex codecs
//! - `cli/`: command-line definitions for the binary

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{ChainParams, GLOBAL_PARAMS};
pub use core::{
    bits_to_target, create_genesis_block, max_target, merkle_root, mine_block, next_target,
    target_to_bits, Block, ExpectedHash, Ledger, MinePolicy, OutPoint, ProofOfWork, Transaction,
    TxInput, TxOutput,
};
pub use error::{LedgerError, Result};
pub use storage::{JsonLedgerStore, LedgerStore, MemoryLedgerStore};
pub use utils::{
    current_timestamp, display_hex_to_hash, from_hex, hash_to_display_hex, sha256_digest, sha256d,
    to_hex,
};
pub use wallet::{
    address_to_hash160, address_to_script, hash160_to_address, script_to_address,
    validate_address,
};
