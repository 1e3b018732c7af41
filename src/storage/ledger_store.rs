//! Persistence boundary for the block list.
//!
//! Chain logic never touches files; it talks to a `LedgerStore`. The
//! JSON store keeps the whole ledger as one array of block records and
//! rewrites it on every append. Appends carry the height the writer
//! believes the ledger has, so a concurrent writer that got there first
//! turns the second append into an error instead of a silent overwrite.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use serde_json::Value;

use crate::core::Block;
use crate::error::{LedgerError, Result};

pub trait LedgerStore {
    /// Load every stored block in ledger order.
    fn load_all(&self) -> Result<Vec<Block>>;

    /// Append one block, verifying the ledger still has exactly
    /// `expected_height` blocks.
    fn append(&self, block: &Block, expected_height: usize) -> Result<()>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load_all(&self) -> Result<Vec<Block>> {
        (**self).load_all()
    }

    fn append(&self, block: &Block, expected_height: usize) -> Result<()> {
        (**self).append(block, expected_height)
    }
}

/// File-backed store: a single JSON array of block records. A missing
/// file is an empty ledger.
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonLedgerStore {
        JsonLedgerStore { path: path.into() }
    }

    fn read_records(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&data)? {
            Value::Array(entries) => Ok(entries),
            other => Err(LedgerError::Store(format!(
                "Ledger file {} does not hold an array of block records, found {}",
                self.path.display(),
                match other {
                    Value::Object(_) => "an object",
                    _ => "a scalar",
                }
            ))),
        }
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load_all(&self) -> Result<Vec<Block>> {
        self.read_records()?
            .iter()
            .map(|entry| Block::from_record(entry, None))
            .collect()
    }

    fn append(&self, block: &Block, expected_height: usize) -> Result<()> {
        let mut records = self.read_records()?;
        if records.len() != expected_height {
            return Err(LedgerError::Store(format!(
                "Append at height {expected_height} conflicts with stored height {}",
                records.len()
            )));
        }
        records.push(block.as_record());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(&Value::Array(records))?)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway ledgers.
pub struct MemoryLedgerStore {
    blocks: RwLock<Vec<Block>>,
}

impl MemoryLedgerStore {
    pub fn new() -> MemoryLedgerStore {
        MemoryLedgerStore {
            blocks: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> MemoryLedgerStore {
        MemoryLedgerStore::new()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_all(&self) -> Result<Vec<Block>> {
        let blocks = self
            .blocks
            .read()
            .map_err(|_| LedgerError::Store("Ledger store lock poisoned".to_string()))?;
        Ok(blocks.clone())
    }

    fn append(&self, block: &Block, expected_height: usize) -> Result<()> {
        let mut blocks = self
            .blocks
            .write()
            .map_err(|_| LedgerError::Store("Ledger store lock poisoned".to_string()))?;
        if blocks.len() != expected_height {
            return Err(LedgerError::Store(format!(
                "Append at height {expected_height} conflicts with stored height {}",
                blocks.len()
            )));
        }
        blocks.push(block.clone());
        Ok(())
    }
}
