// Block model: six header fields plus the transaction list. The block
// hash covers the 80-byte header encoding only; transactions are bound
// to the header through the merkle root, not through the hash itself.

use crate::core::merkle::merkle_root;
use crate::core::record::{as_object, field_array, field_hash, field_u32};
use crate::core::transaction::Transaction;
use crate::error::{LedgerError, Result};
use crate::utils::{display_hex_to_hash, hash_to_display_hex, sha256d, ByteReader};
use serde_json::{json, Value};

/// A declared block hash supplied alongside a persisted record, in the
/// conventional display (byte-reversed) order, either hex or raw.
pub enum ExpectedHash<'a> {
    Hex(&'a str),
    Raw(&'a [u8; 32]),
}

/// A block: header fields and the ordered transactions it commits to.
///
/// Immutable once its nonce is fixed by successful mining; the ledger
/// appends it and never mutates it thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    version: u32,
    prev_block_hash: [u8; 32],
    merkle_root: [u8; 32],
    timestamp: u32,
    bits: u32,
    nonce: u32,
    transactions: Vec<Transaction>,
}

impl Block {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        version: u32,
        prev_block_hash: [u8; 32],
        merkle_root: [u8; 32],
        timestamp: u32,
        bits: u32,
        nonce: u32,
        transactions: Vec<Transaction>,
    ) -> Block {
        Block {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
            transactions,
        }
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn get_prev_block_hash(&self) -> &[u8; 32] {
        &self.prev_block_hash
    }

    pub fn get_merkle_root(&self) -> &[u8; 32] {
        &self.merkle_root
    }

    pub fn get_timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn get_bits(&self) -> u32 {
        self.bits
    }

    pub fn get_nonce(&self) -> u32 {
        self.nonce
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    // The nonce is only written during mining; a block is frozen once
    // the search succeeds.
    pub(crate) fn set_nonce(&mut self, nonce: u32) {
        self.nonce = nonce;
    }

    /// The 80-byte header encoding the block hash is computed over:
    /// `version || prev_block_hash || merkle_root || timestamp || bits || nonce`,
    /// integers little-endian, hashes in wire order.
    pub fn header_bytes(&self) -> [u8; 80] {
        let mut header = [0u8; 80];
        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        header
    }

    /// Full wire encoding: header, transaction count, transactions.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(80 + 64 * self.transactions.len());
        out.extend_from_slice(&self.header_bytes());
        out.extend_from_slice(&crate::utils::encode_varint(self.transactions.len() as u64));
        for tx in &self.transactions {
            out.extend_from_slice(&tx.to_bytes());
        }
        out
    }

    /// Decode a block from its full wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Block> {
        let mut reader = ByteReader::new(bytes);
        let version = reader.read_u32_le()?;
        let prev_block_hash = reader.read_hash()?;
        let merkle_root = reader.read_hash()?;
        let timestamp = reader.read_u32_le()?;
        let bits = reader.read_u32_le()?;
        let nonce = reader.read_u32_le()?;
        let tx_count = reader.read_varint()?;
        let mut transactions = Vec::with_capacity(tx_count as usize);
        for _ in 0..tx_count {
            transactions.push(Transaction::read(&mut reader)?);
        }
        if reader.remaining() != 0 {
            return Err(LedgerError::Format(format!(
                "Trailing bytes after block: {} remain",
                reader.remaining()
            )));
        }
        Ok(Block {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
            transactions,
        })
    }

    /// Block hash: sha256d of the header encoding only. Mining searches
    /// over this; transaction contents never enter it directly.
    pub fn block_hash(&self) -> [u8; 32] {
        sha256d(&self.header_bytes())
    }

    /// Check that the recorded merkle root matches the aggregation of
    /// the block's transaction hashes in order.
    pub fn verify_merkle_root(&self) -> Result<bool> {
        let leaves: Vec<[u8; 32]> = self.transactions.iter().map(|tx| tx.hash()).collect();
        Ok(merkle_root(&leaves)? == self.merkle_root)
    }

    /// JSON record form. Block-level hashes are hex in display
    /// (byte-reversed) order.
    pub fn as_record(&self) -> Value {
        json!({
            "version": self.version,
            "hash_prev_block": hash_to_display_hex(&self.prev_block_hash),
            "hash_merkle_root": hash_to_display_hex(&self.merkle_root),
            "time": self.timestamp,
            "bits": self.bits,
            "nonce": self.nonce,
            "transactions": self.transactions.iter().map(|tx| tx.as_record()).collect::<Vec<_>>(),
        })
    }

    /// Decode a block from its JSON record form. When `expected_hash`
    /// is given it must match the recomputed header hash, otherwise the
    /// record is rejected outright and no block is produced.
    pub fn from_record(value: &Value, expected_hash: Option<ExpectedHash>) -> Result<Block> {
        let record = as_object(value, "block")?;
        let mut transactions = Vec::new();
        for entry in field_array(record, "transactions")? {
            transactions.push(Transaction::from_record(entry)?);
        }
        let block = Block {
            version: field_u32(record, "version")?,
            prev_block_hash: field_hash(record, "hash_prev_block", true)?,
            merkle_root: field_hash(record, "hash_merkle_root", true)?,
            timestamp: field_u32(record, "time")?,
            bits: field_u32(record, "bits")?,
            nonce: field_u32(record, "nonce")?,
            transactions,
        };

        if let Some(expected) = expected_hash {
            let declared = match expected {
                ExpectedHash::Hex(hex) => display_hex_to_hash(hex)?,
                ExpectedHash::Raw(raw) => {
                    let mut hash = *raw;
                    hash.reverse();
                    hash
                }
            };
            let recomputed = block.block_hash();
            if declared != recomputed {
                return Err(LedgerError::Integrity(format!(
                    "Declared block hash {} does not match recomputed {}",
                    hash_to_display_hex(&declared),
                    hash_to_display_hex(&recomputed),
                )));
            }
        }

        Ok(block)
    }
}
