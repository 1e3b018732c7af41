//! Locking-script support, limited to the pay-to-public-key-hash
//! pattern. There is no script interpreter; the matcher recognizes one
//! exact byte shape and rejects everything else.

use crate::error::{LedgerError, Result};

pub const OP_DUP: u8 = 0x76;
pub const OP_HASH160: u8 = 0xA9;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_CHECKSIG: u8 = 0xAC;
pub const OP_PUSHDATA1: u8 = 0x4C;
pub const OP_PUSHDATA2: u8 = 0x4D;
pub const OP_PUSHDATA4: u8 = 0x4E;

const HASH160_LEN: usize = 20;
// OP_DUP OP_HASH160 <20-byte hash> OP_EQUALVERIFY OP_CHECKSIG
const P2PKH_LEN: usize = HASH160_LEN + 4;

/// Script push-length encoding: data shorter than `OP_PUSHDATA1` is
/// prefixed with its raw length, longer data gets the tiered
/// PUSHDATA1/2/4 markers. Used when embedding auxiliary data (genesis
/// message, block height) in coinbase unlocking scripts.
pub fn push_data(data: &[u8]) -> Vec<u8> {
    let len = data.len();
    let mut out = Vec::with_capacity(len + 5);
    if len < OP_PUSHDATA1 as usize {
        out.push(len as u8);
    } else if len <= 0xFF {
        out.push(OP_PUSHDATA1);
        out.push(len as u8);
    } else if len <= 0xFFFF {
        out.push(OP_PUSHDATA2);
        out.extend_from_slice(&(len as u16).to_le_bytes());
    } else {
        out.push(OP_PUSHDATA4);
        out.extend_from_slice(&(len as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
    out
}

/// Build the pay-to-public-key-hash locking script for a 20-byte hash.
pub fn p2pkh_script(hash160: &[u8; HASH160_LEN]) -> Vec<u8> {
    let mut script = Vec::with_capacity(P2PKH_LEN);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.extend_from_slice(hash160);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// Match a locking script against the exact P2PKH pattern, returning
/// the embedded hash. Anything else is not a supported payment pattern.
pub fn extract_p2pkh_hash(script: &[u8]) -> Result<[u8; HASH160_LEN]> {
    if script.len() != P2PKH_LEN
        || script[0] != OP_DUP
        || script[1] != OP_HASH160
        || script[P2PKH_LEN - 2] != OP_EQUALVERIFY
        || script[P2PKH_LEN - 1] != OP_CHECKSIG
    {
        return Err(LedgerError::Format(
            "Locking script is not a supported payment pattern".to_string(),
        ));
    }
    let mut hash = [0u8; HASH160_LEN];
    hash.copy_from_slice(&script[2..2 + HASH160_LEN]);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_data_tiers() {
        assert_eq!(push_data(&[0xAB])[..], [0x01, 0xAB]);

        let medium = vec![0x11u8; 0x4C];
        let encoded = push_data(&medium);
        assert_eq!(encoded[0], OP_PUSHDATA1);
        assert_eq!(encoded[1], 0x4C);
        assert_eq!(encoded.len(), 2 + 0x4C);

        let large = vec![0x22u8; 0x100];
        let encoded = push_data(&large);
        assert_eq!(encoded[0], OP_PUSHDATA2);
        assert_eq!(&encoded[1..3], &0x100u16.to_le_bytes());
    }

    #[test]
    fn test_p2pkh_round_trip() {
        let hash = [0x5Au8; 20];
        let script = p2pkh_script(&hash);
        assert_eq!(script.len(), 24);
        assert_eq!(extract_p2pkh_hash(&script).unwrap(), hash);
    }

    #[test]
    fn test_matcher_rejects_other_patterns() {
        // Wrong length
        assert!(extract_p2pkh_hash(&[OP_DUP, OP_HASH160]).is_err());
        // Right length, wrong opcodes
        let mut script = p2pkh_script(&[0u8; 20]);
        script[0] = OP_CHECKSIG;
        assert!(extract_p2pkh_hash(&script).is_err());
        // Truncated tail opcode
        let mut script = p2pkh_script(&[0u8; 20]);
        script[23] = 0x00;
        assert!(extract_p2pkh_hash(&script).is_err());
    }
}
