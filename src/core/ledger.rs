//! Append-only chain state over a pluggable store.
//!
//! The ledger keeps the full block list in memory and mirrors every
//! accepted block to its store before exposing it. A block is accepted
//! only if it links to the current tip, declares the bits the retarget
//! schedule demands, commits to its transactions through the merkle
//! root, and carries valid proof of work.

use crate::config::ChainParams;
use crate::core::block::Block;
use crate::core::difficulty::{next_target, target_to_bits};
use crate::core::proof_of_work::ProofOfWork;
use crate::error::{LedgerError, Result};
use crate::storage::LedgerStore;
use crate::utils::hash_to_display_hex;
use log::info;
use num_bigint::BigUint;

pub struct Ledger<S: LedgerStore> {
    store: S,
    params: ChainParams,
    blocks: Vec<Block>,
}

impl<S: LedgerStore> Ledger<S> {
    /// Start a new ledger from a mined genesis block. Fails if the store
    /// already holds blocks.
    pub fn create(store: S, params: ChainParams, genesis: Block) -> Result<Ledger<S>> {
        if !store.load_all()?.is_empty() {
            return Err(LedgerError::Store(
                "Ledger already exists, refusing to overwrite it".to_string(),
            ));
        }
        if genesis.get_prev_block_hash() != &[0u8; 32] {
            return Err(LedgerError::InvalidBlock(
                "Genesis block must have an all-zero previous hash".to_string(),
            ));
        }
        if !genesis.verify_merkle_root()? {
            return Err(LedgerError::InvalidBlock(
                "Genesis merkle root does not match its transactions".to_string(),
            ));
        }
        if !ProofOfWork::validate(&genesis)? {
            return Err(LedgerError::InvalidBlock(
                "Genesis block does not satisfy its own target".to_string(),
            ));
        }

        store.append(&genesis, 0)?;
        info!(
            "Created ledger with genesis {}",
            hash_to_display_hex(&genesis.block_hash())
        );
        Ok(Ledger {
            store,
            params,
            blocks: vec![genesis],
        })
    }

    /// Load an existing ledger from its store.
    pub fn open(store: S, params: ChainParams) -> Result<Ledger<S>> {
        let blocks = store.load_all()?;
        if blocks.is_empty() {
            return Err(LedgerError::Store(
                "No ledger found, create one with a genesis block first".to_string(),
            ));
        }
        Ok(Ledger {
            store,
            params,
            blocks,
        })
    }

    pub fn height(&self) -> usize {
        self.blocks.len()
    }

    pub fn tip(&self) -> &Block {
        // create/open guarantee at least the genesis block
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_slice()
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Target the next appended block must satisfy.
    pub fn next_target(&self) -> Result<BigUint> {
        next_target(&self.blocks, &self.params)
    }

    /// Validate a candidate against the current tip and persist it.
    /// The store append is all-or-nothing; on any failure the in-memory
    /// state is unchanged.
    pub fn append_block(&mut self, block: Block) -> Result<()> {
        let tip_hash = self.tip().block_hash();
        if block.get_prev_block_hash() != &tip_hash {
            return Err(LedgerError::InvalidBlock(format!(
                "Block links to {} but the tip is {}",
                hash_to_display_hex(block.get_prev_block_hash()),
                hash_to_display_hex(&tip_hash),
            )));
        }

        let required_bits = target_to_bits(&self.next_target()?);
        if block.get_bits() != required_bits {
            return Err(LedgerError::InvalidBlock(format!(
                "Block declares bits {:#010x} but the schedule requires {required_bits:#010x}",
                block.get_bits(),
            )));
        }

        if !block.verify_merkle_root()? {
            return Err(LedgerError::InvalidBlock(
                "Merkle root does not match the block's transactions".to_string(),
            ));
        }
        if !ProofOfWork::validate(&block)? {
            return Err(LedgerError::InvalidBlock(
                "Block hash does not satisfy the declared target".to_string(),
            ));
        }

        self.store.append(&block, self.blocks.len())?;
        info!(
            "Appended block {} at height {}",
            hash_to_display_hex(&block.block_hash()),
            self.blocks.len(),
        );
        self.blocks.push(block);
        Ok(())
    }

    /// Walk the whole chain and re-check linkage, merkle commitments and
    /// proof of work for every block.
    pub fn verify(&self) -> Result<()> {
        let mut prev_hash = [0u8; 32];
        for (height, block) in self.blocks.iter().enumerate() {
            if block.get_prev_block_hash() != &prev_hash {
                return Err(LedgerError::Integrity(format!(
                    "Block at height {height} does not link to its predecessor"
                )));
            }
            if !block.verify_merkle_root()? {
                return Err(LedgerError::Integrity(format!(
                    "Block at height {height} has a mismatched merkle root"
                )));
            }
            if !ProofOfWork::validate(block)? {
                return Err(LedgerError::Integrity(format!(
                    "Block at height {height} does not satisfy its target"
                )));
            }
            prev_hash = block.block_hash();
        }
        Ok(())
    }
}
