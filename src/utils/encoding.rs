//! Wire-level encoding helpers: compact counts, little-endian readers,
//! and the hex display conventions for 32-byte hashes.

use crate::error::{LedgerError, Result};
use data_encoding::HEXLOWER;

/// Encode a count in the compact variable-length form.
///
/// `n < 0xFD` is a single byte; larger values get a marker byte
/// (0xFD/0xFE/0xFF) followed by 2/4/8 little-endian bytes. The byte
/// layout is part of the consensus encoding and must stay bit-exact.
pub fn encode_varint(n: u64) -> Vec<u8> {
    if n < 0xFD {
        vec![n as u8]
    } else if n <= 0xFFFF {
        let mut out = vec![0xFDu8];
        out.extend_from_slice(&(n as u16).to_le_bytes());
        out
    } else if n <= 0xFFFF_FFFF {
        let mut out = vec![0xFEu8];
        out.extend_from_slice(&(n as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xFFu8];
        out.extend_from_slice(&n.to_le_bytes());
        out
    }
}

/// Decode a compact count, returning the value and the number of bytes
/// consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize)> {
    let first = *bytes
        .first()
        .ok_or_else(|| LedgerError::Format("Truncated varint: empty input".to_string()))?;
    match first {
        0xFD => {
            let raw = take(bytes, 1, 2)?;
            Ok((u16::from_le_bytes([raw[0], raw[1]]) as u64, 3))
        }
        0xFE => {
            let raw = take(bytes, 1, 4)?;
            Ok((u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as u64, 5))
        }
        0xFF => {
            let raw = take(bytes, 1, 8)?;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(raw);
            Ok((u64::from_le_bytes(buf), 9))
        }
        n => Ok((n as u64, 1)),
    }
}

fn take(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    bytes.get(offset..offset + len).ok_or_else(|| {
        LedgerError::Format(format!(
            "Truncated varint: expected {len} bytes after marker, got {}",
            bytes.len().saturating_sub(offset)
        ))
    })
}

/// Cursor over a wire-encoded byte sequence. The full record decoders
/// read through this so truncation always surfaces as a `Format` error.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let slice = self.bytes.get(self.pos..self.pos + len).ok_or_else(|| {
            LedgerError::Format(format!(
                "Truncated input: wanted {len} bytes at offset {}, {} remain",
                self.pos,
                self.remaining()
            ))
        })?;
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let raw = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        let raw = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(raw);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_hash(&mut self) -> Result<[u8; 32]> {
        let raw = self.read_bytes(32)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(raw);
        Ok(hash)
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = decode_varint(&self.bytes[self.pos..])?;
        self.pos += consumed;
        Ok(value)
    }
}

/// Hex-encode arbitrary bytes (wire order).
pub fn to_hex(bytes: &[u8]) -> String {
    HEXLOWER.encode(bytes)
}

/// Decode hex into bytes (wire order).
pub fn from_hex(hex: &str) -> Result<Vec<u8>> {
    HEXLOWER
        .decode(hex.as_bytes())
        .map_err(|e| LedgerError::Format(format!("Invalid hex: {e}")))
}

/// Render a 32-byte hash in display order (byte-reversed hex), the
/// conventional presentation for block and transaction hashes.
pub fn hash_to_display_hex(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    HEXLOWER.encode(&reversed)
}

/// Parse a display-order hex hash back into wire byte order.
pub fn display_hex_to_hash(hex: &str) -> Result<[u8; 32]> {
    let raw = from_hex(hex)?;
    if raw.len() != 32 {
        return Err(LedgerError::Format(format!(
            "Expected 32-byte hash, got {} bytes",
            raw.len()
        )));
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&raw);
    hash.reverse();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_goldens() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(0xFD), vec![0xFD, 0xFD, 0x00]);
        assert_eq!(encode_varint(0x10000), vec![0xFE, 0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn test_varint_round_trip_all_branches() {
        let boundaries: [u64; 7] = [0, 0xFC, 0xFD, 0xFFFF, 0x10000, 0xFFFF_FFFF, 0x1_0000_0000];
        for &n in &boundaries {
            let encoded = encode_varint(n);
            let (decoded, consumed) = decode_varint(&encoded).unwrap();
            assert_eq!(decoded, n, "round trip failed for {n:#x}");
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn test_varint_branch_lengths() {
        assert_eq!(encode_varint(0xFC).len(), 1);
        assert_eq!(encode_varint(0xFD).len(), 3);
        assert_eq!(encode_varint(0xFFFF).len(), 3);
        assert_eq!(encode_varint(0x10000).len(), 5);
        assert_eq!(encode_varint(0xFFFF_FFFF).len(), 5);
        assert_eq!(encode_varint(0x1_0000_0000).len(), 9);
    }

    #[test]
    fn test_varint_truncated_input() {
        assert!(decode_varint(&[]).is_err());
        assert!(decode_varint(&[0xFD, 0x01]).is_err());
        assert!(decode_varint(&[0xFE, 0x01, 0x02]).is_err());
        assert!(decode_varint(&[0xFF, 0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn test_display_hex_reverses_byte_order() {
        let mut hash = [0u8; 32];
        hash[0] = 0xAB;
        let display = hash_to_display_hex(&hash);
        assert!(display.ends_with("ab"));
        assert!(display.starts_with("00"));
        assert_eq!(display_hex_to_hash(&display).unwrap(), hash);
    }

    #[test]
    fn test_display_hex_rejects_wrong_length() {
        assert!(display_hex_to_hash("abcd").is_err());
    }

    #[test]
    fn test_byte_reader_truncation() {
        let mut reader = ByteReader::new(&[1, 2, 3]);
        assert!(reader.read_u32_le().is_err());
    }
}
