//! Proof-of-work search and verification.
//!
//! Mining patches the nonce field of a fixed 80-byte header and hashes
//! until the result, read as a big-endian integer, falls below the
//! target decoded from the block's own bits. The starting nonce is
//! random; when the scan hits `u32::MAX` it restarts from a fresh random
//! nonce rather than wrapping, so exhaustion is invisible to callers.

use crate::config::ChainParams;
use crate::core::block::Block;
use crate::core::difficulty::{bits_to_target, next_target, target_to_bits};
use crate::core::merkle::merkle_root;
use crate::core::transaction::Transaction;
use crate::error::{LedgerError, Result};
use crate::utils::{current_timestamp, from_hex, sha256d};
use crate::wallet::script::push_data;
use log::{debug, info};
use num_bigint::BigUint;
use rand::Rng;

// The locking script of the first-ever coinbase output, reused verbatim:
// a pay-to-public-key script for a key nothing here holds.
const GENESIS_SCRIPT_PUBKEY: &str =
    "4104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac";

// Embedded in the genesis unlocking script regardless of the configured
// starting difficulty.
const GENESIS_EMBEDDED_BITS: u32 = 0x1d00ffff;

/// Stopping condition for the nonce search. Production mining runs
/// unbounded; tests cap the total number of hash attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinePolicy {
    Unbounded,
    Attempts(u64),
}

/// A nonce search over one candidate block.
pub struct ProofOfWork {
    block: Block,
    target: BigUint,
}

impl ProofOfWork {
    pub fn new(block: Block) -> Result<ProofOfWork> {
        let target = bits_to_target(block.get_bits())?;
        Ok(ProofOfWork { block, target })
    }

    /// Search for a nonce satisfying the target, consuming the candidate
    /// and returning it with the winning nonce set.
    pub fn run(self, policy: MinePolicy) -> Result<Block> {
        let start = rand::thread_rng().gen::<u32>();
        self.run_from(start, policy)
    }

    // Deterministic entry point so tests can pin the starting nonce.
    pub(crate) fn run_from(mut self, start: u32, policy: MinePolicy) -> Result<Block> {
        let mut budget = match policy {
            MinePolicy::Unbounded => None,
            MinePolicy::Attempts(n) => Some(n),
        };
        let mut header = self.block.header_bytes();
        let mut start = start;

        loop {
            for nonce in start..=u32::MAX {
                if let Some(remaining) = budget.as_mut() {
                    if *remaining == 0 {
                        return Err(LedgerError::Mining(
                            "Attempt budget spent without finding a valid nonce".to_string(),
                        ));
                    }
                    *remaining -= 1;
                }

                header[76..80].copy_from_slice(&nonce.to_le_bytes());
                let hash = sha256d(&header);
                if BigUint::from_bytes_be(&hash) < self.target {
                    info!(
                        "Found nonce {nonce} for block with bits {:#010x}",
                        self.block.get_bits()
                    );
                    self.block.set_nonce(nonce);
                    return Ok(self.block);
                }
            }
            debug!("Nonce range exhausted from start {start}, restarting at a fresh random nonce");
            start = rand::thread_rng().gen::<u32>();
        }
    }

    /// Check a block's header hash against the target decoded from its
    /// own bits field.
    pub fn validate(block: &Block) -> Result<bool> {
        let target = bits_to_target(block.get_bits())?;
        Ok(BigUint::from_bytes_be(&block.block_hash()) < target)
    }
}

/// Build and mine the first block of a ledger.
///
/// Its single coinbase transaction carries the conventional unlocking
/// script payload: the 0x1d00ffff bits bytes, the one-byte "4" literal,
/// and the ASCII genesis message, each with a script push-length prefix.
pub fn create_genesis_block(params: &ChainParams, policy: MinePolicy) -> Result<Block> {
    let mut script_sig = push_data(&GENESIS_EMBEDDED_BITS.to_le_bytes());
    script_sig.extend_from_slice(b"\x01\x04");
    script_sig.extend_from_slice(&push_data(params.genesis_message.as_bytes()));

    let script_pubkey = from_hex(GENESIS_SCRIPT_PUBKEY)?;
    let coinbase = Transaction::new_coinbase(script_sig, params.block_reward, script_pubkey);
    let root = merkle_root(&[coinbase.hash()])?;

    let candidate = Block::new(
        1,
        [0u8; 32],
        root,
        current_timestamp()?,
        params.initial_bits,
        0,
        vec![coinbase],
    );
    ProofOfWork::new(candidate)?.run(policy)
}

/// Build and mine the next block on top of the given history, paying the
/// configured reward to `dest_script`. The block height is embedded in
/// the coinbase unlocking script as a minimal little-endian push.
pub fn mine_block(
    blocks: &[Block],
    dest_script: Vec<u8>,
    params: &ChainParams,
    policy: MinePolicy,
) -> Result<Block> {
    let tip = blocks.last().ok_or_else(|| {
        LedgerError::InvalidBlock(
            "Cannot mine on an empty ledger, create a genesis block first".to_string(),
        )
    })?;

    let height = blocks.len() as u64;
    let script_sig = push_data(&height_bytes(height));
    let coinbase = Transaction::new_coinbase(script_sig, params.block_reward, dest_script);
    let root = merkle_root(&[coinbase.hash()])?;

    let target = next_target(blocks, params)?;
    let candidate = Block::new(
        1,
        tip.block_hash(),
        root,
        current_timestamp()?,
        target_to_bits(&target),
        0,
        vec![coinbase],
    );
    ProofOfWork::new(candidate)?.run(policy)
}

// Minimal little-endian encoding, at least one byte.
fn height_bytes(height: u64) -> Vec<u8> {
    let mut bytes = height.to_le_bytes().to_vec();
    while bytes.len() > 1 && bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    // Roughly one in 512 hashes satisfies this target, so bounded tests
    // finish in well under a second.
    const EASY_BITS: u32 = 0x1f7fffff;

    fn easy_params() -> ChainParams {
        ChainParams {
            initial_bits: EASY_BITS,
            max_target_bits: EASY_BITS,
            genesis_message: "unit test genesis".to_string(),
            ..ChainParams::new()
        }
    }

    #[test]
    fn test_genesis_block_shape() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();

        assert_eq!(genesis.get_version(), 1);
        assert_eq!(genesis.get_prev_block_hash(), &[0u8; 32]);
        assert_eq!(genesis.get_bits(), EASY_BITS);
        assert_eq!(genesis.get_transactions().len(), 1);

        let coinbase = &genesis.get_transactions()[0];
        assert!(coinbase.is_coinbase());
        assert_eq!(genesis.get_merkle_root(), &coinbase.hash());

        // Unlocking script: <4-byte bits> "4" <message>
        let script_sig = coinbase.get_inputs()[0].get_script_sig();
        assert_eq!(&script_sig[..5], &[0x04, 0xFF, 0xFF, 0x00, 0x1D]);
        assert_eq!(&script_sig[5..7], b"\x01\x04");
        assert_eq!(script_sig[7] as usize, params.genesis_message.len());
        assert_eq!(&script_sig[8..], params.genesis_message.as_bytes());

        assert!(ProofOfWork::validate(&genesis).unwrap());
    }

    #[test]
    fn test_mined_block_links_to_tip() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();
        let block = mine_block(
            std::slice::from_ref(&genesis),
            vec![0xAC],
            &params,
            MinePolicy::Attempts(500_000),
        )
        .unwrap();

        assert_eq!(block.get_prev_block_hash(), &genesis.block_hash());
        assert!(ProofOfWork::validate(&block).unwrap());

        let coinbase = &block.get_transactions()[0];
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.get_outputs()[0].get_value(), params.block_reward);
        // Height 1 as a one-byte push
        assert_eq!(coinbase.get_inputs()[0].get_script_sig(), &[0x01, 0x01]);
    }

    #[test]
    fn test_trivial_target_terminates_in_one_attempt() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();
        // A target above every possible hash accepts the first nonce tried
        let pow = ProofOfWork {
            block: genesis.clone(),
            target: BigUint::from(1u32) << 256,
        };
        let mined = pow.run_from(12_345, MinePolicy::Attempts(1)).unwrap();
        assert_eq!(mined.get_nonce(), 12_345);
    }

    #[test]
    fn test_mining_on_empty_history_fails() {
        let params = easy_params();
        let result = mine_block(&[], vec![0xAC], &params, MinePolicy::Attempts(1));
        assert!(matches!(result, Err(LedgerError::InvalidBlock(_))));
    }

    #[test]
    fn test_bounded_search_fails_on_unreachable_target() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();
        // Hardest representable target: a hash below 0x8000 never occurs
        let candidate = Block::new(
            1,
            genesis.block_hash(),
            *genesis.get_merkle_root(),
            genesis.get_timestamp(),
            0x03008000,
            0,
            genesis.get_transactions().to_vec(),
        );
        let result = ProofOfWork::new(candidate)
            .unwrap()
            .run(MinePolicy::Attempts(1_000));
        assert!(matches!(result, Err(LedgerError::Mining(_))));
    }

    #[test]
    fn test_exhaustion_restarts_instead_of_failing() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();
        let candidate = Block::new(
            1,
            genesis.block_hash(),
            *genesis.get_merkle_root(),
            genesis.get_timestamp(),
            EASY_BITS,
            0,
            genesis.get_transactions().to_vec(),
        );
        // Starting 8 nonces below the top forces at least one restart
        // before the budget runs out; the search still succeeds.
        let mined = ProofOfWork::new(candidate)
            .unwrap()
            .run_from(u32::MAX - 8, MinePolicy::Attempts(500_000));
        assert!(ProofOfWork::validate(&mined.unwrap()).unwrap());
    }

    #[test]
    fn test_validate_rejects_unworked_header() {
        let params = easy_params();
        let genesis = create_genesis_block(&params, MinePolicy::Attempts(500_000)).unwrap();
        let unworked = Block::new(
            1,
            genesis.block_hash(),
            *genesis.get_merkle_root(),
            genesis.get_timestamp(),
            0x03008000,
            0,
            genesis.get_transactions().to_vec(),
        );
        assert!(!ProofOfWork::validate(&unworked).unwrap());
    }

    #[test]
    fn test_height_bytes_minimal_le() {
        assert_eq!(height_bytes(0), vec![0x00]);
        assert_eq!(height_bytes(1), vec![0x01]);
        assert_eq!(height_bytes(0x1234), vec![0x34, 0x12]);
        assert_eq!(height_bytes(0x0100_0000), vec![0x00, 0x00, 0x00, 0x01]);
    }
}
