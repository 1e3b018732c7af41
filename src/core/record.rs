//! Typed access to JSON ledger records.
//!
//! Persisted blocks and transactions travel as JSON objects with
//! hex-encoded byte fields. These helpers enforce the schema explicitly:
//! every accessor names the offending field in its error instead of
//! letting a loosely shaped record propagate.

use crate::error::{LedgerError, Result};
use crate::utils::from_hex;
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

/// View a JSON value as an object record.
pub fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Record> {
    value.as_object().ok_or_else(|| LedgerError::Schema {
        field: what.to_string(),
        reason: "expected a JSON object".to_string(),
    })
}

fn get<'a>(record: &'a Record, field: &str) -> Result<&'a Value> {
    record.get(field).ok_or_else(|| LedgerError::Schema {
        field: field.to_string(),
        reason: "missing required field".to_string(),
    })
}

pub fn field_u32(record: &Record, field: &str) -> Result<u32> {
    let value = get(record, field)?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| LedgerError::Schema {
            field: field.to_string(),
            reason: format!("expected an unsigned 32-bit integer, got {value}"),
        })
}

pub fn field_u64(record: &Record, field: &str) -> Result<u64> {
    let value = get(record, field)?;
    value.as_u64().ok_or_else(|| LedgerError::Schema {
        field: field.to_string(),
        reason: format!("expected an unsigned 64-bit integer, got {value}"),
    })
}

/// Hex-encoded byte field, wire order.
pub fn field_hex(record: &Record, field: &str) -> Result<Vec<u8>> {
    let value = get(record, field)?;
    let hex = value.as_str().ok_or_else(|| LedgerError::Schema {
        field: field.to_string(),
        reason: "expected a hex string".to_string(),
    })?;
    from_hex(hex).map_err(|e| LedgerError::Schema {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Hex-encoded 32-byte hash field, with the display-to-wire byte
/// reversal applied when `reverse` is set (block-level hashes are
/// conventionally displayed reversed).
pub fn field_hash(record: &Record, field: &str, reverse: bool) -> Result<[u8; 32]> {
    let raw = field_hex(record, field)?;
    if raw.len() != 32 {
        return Err(LedgerError::Schema {
            field: field.to_string(),
            reason: format!("expected a 32-byte hash, got {} bytes", raw.len()),
        });
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&raw);
    if reverse {
        hash.reverse();
    }
    Ok(hash)
}

pub fn field_array<'a>(record: &'a Record, field: &str) -> Result<&'a Vec<Value>> {
    let value = get(record, field)?;
    value.as_array().ok_or_else(|| LedgerError::Schema {
        field: field.to_string(),
        reason: "expected an array".to_string(),
    })
}

pub fn field_object<'a>(record: &'a Record, field: &str) -> Result<&'a Record> {
    let value = get(record, field)?;
    value.as_object().ok_or_else(|| LedgerError::Schema {
        field: field.to_string(),
        reason: "expected a JSON object".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_missing_field_names_field() {
        let rec = record(json!({ "version": 1 }));
        let err = field_u32(&rec, "nonce").unwrap_err();
        assert!(err.to_string().contains("nonce"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let rec = record(json!({ "version": "one" }));
        assert!(field_u32(&rec, "version").is_err());
    }

    #[test]
    fn test_negative_rejected() {
        let rec = record(json!({ "value": -5 }));
        assert!(field_u64(&rec, "value").is_err());
    }

    #[test]
    fn test_hash_length_checked() {
        let rec = record(json!({ "tx_hash": "abcd" }));
        assert!(field_hash(&rec, "tx_hash", false).is_err());
    }

    #[test]
    fn test_hash_reversal() {
        let mut hex = String::from("00");
        hex.push_str(&"11".repeat(30));
        hex.push_str("ff");
        let rec = record(json!({ "h": hex }));

        let plain = field_hash(&rec, "h", false).unwrap();
        assert_eq!(plain[0], 0x00);
        assert_eq!(plain[31], 0xff);

        let reversed = field_hash(&rec, "h", true).unwrap();
        assert_eq!(reversed[0], 0xff);
        assert_eq!(reversed[31], 0x00);
    }
}
