//! Base58Check addresses over a 20-byte payment hash.
//!
//! An address encodes `version || hash160 || checksum` where the
//! checksum is the first four bytes of sha256d over the versioned
//! payload. Decoding validates the exact length and the checksum before
//! anything else looks at the contents.

use crate::error::{LedgerError, Result};
use crate::utils::sha256d;
use crate::wallet::script::{extract_p2pkh_hash, p2pkh_script};

const ADDRESS_VERSION: u8 = 0x00;
const CHECKSUM_LEN: usize = 4;
const HASH160_LEN: usize = 20;
// version byte + hash160 + checksum
const ADDRESS_LEN: usize = 1 + HASH160_LEN + CHECKSUM_LEN;

fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = sha256d(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}

/// Encode a 20-byte payment hash as a Base58Check address.
pub fn hash160_to_address(hash160: &[u8; HASH160_LEN]) -> String {
    let mut payload = Vec::with_capacity(ADDRESS_LEN);
    payload.push(ADDRESS_VERSION);
    payload.extend_from_slice(hash160);
    let check = checksum(&payload);
    payload.extend_from_slice(&check);
    bs58::encode(payload).into_string()
}

/// Decode an address back to its 20-byte payment hash, rejecting
/// malformed Base58, wrong lengths, checksum mismatches, and unknown
/// version bytes.
pub fn address_to_hash160(address: &str) -> Result<[u8; HASH160_LEN]> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| LedgerError::InvalidAddress(format!("Not valid base58: {e}")))?;

    if decoded.len() != ADDRESS_LEN {
        return Err(LedgerError::InvalidAddress(format!(
            "Decoded address is {} bytes, expected {ADDRESS_LEN}",
            decoded.len()
        )));
    }

    let (payload, declared_check) = decoded.split_at(ADDRESS_LEN - CHECKSUM_LEN);
    if checksum(payload) != declared_check {
        return Err(LedgerError::InvalidAddress(
            "Address checksum mismatch".to_string(),
        ));
    }
    if payload[0] != ADDRESS_VERSION {
        return Err(LedgerError::InvalidAddress(format!(
            "Unsupported address version byte {:#04x}",
            payload[0]
        )));
    }

    let mut hash160 = [0u8; HASH160_LEN];
    hash160.copy_from_slice(&payload[1..]);
    Ok(hash160)
}

/// True when the string decodes as a well-formed address.
pub fn validate_address(address: &str) -> bool {
    address_to_hash160(address).is_ok()
}

/// Build the locking script paying to the given address.
pub fn address_to_script(address: &str) -> Result<Vec<u8>> {
    Ok(p2pkh_script(&address_to_hash160(address)?))
}

/// Recover the address a locking script pays to, if it matches the
/// supported payment pattern.
pub fn script_to_address(script: &[u8]) -> Result<String> {
    Ok(hash160_to_address(&extract_p2pkh_hash(script)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_round_trip() {
        let hash160 = [0x3Cu8; 20];
        let address = hash160_to_address(&hash160);
        assert_eq!(address_to_hash160(&address).unwrap(), hash160);
        assert!(validate_address(&address));
    }

    #[test]
    fn test_zero_hash_known_address() {
        // version 0x00 plus twenty zero bytes
        let address = hash160_to_address(&[0u8; 20]);
        assert_eq!(address, "1111111111111111111114oLvT2");
    }

    #[test]
    fn test_corrupted_address_rejected() {
        let address = hash160_to_address(&[0x3Cu8; 20]);
        // Flip one character without leaving the base58 alphabet
        let mut chars: Vec<char> = address.chars().collect();
        chars[10] = if chars[10] == 'a' { 'b' } else { 'a' };
        let corrupted: String = chars.into_iter().collect();
        assert!(!validate_address(&corrupted));
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!(address_to_hash160("").is_err());
        assert!(address_to_hash160("3yQ").is_err());
        assert!(address_to_hash160("0OIl").is_err());
    }

    #[test]
    fn test_script_address_round_trip() {
        let hash160 = [0x77u8; 20];
        let address = hash160_to_address(&hash160);
        let script = address_to_script(&address).unwrap();
        assert_eq!(script_to_address(&script).unwrap(), address);
    }
}
