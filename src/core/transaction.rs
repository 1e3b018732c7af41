// Transaction model: outpoints, inputs, outputs and the aggregate
// transaction, with the canonical little-endian wire encoding that every
// content hash is computed over. The encoding is a pure function of the
// fields; identical field values always produce identical hashes.

use crate::core::record::{
    as_object, field_array, field_hash, field_hex, field_object, field_u32, field_u64, Record,
};
use crate::error::{LedgerError, Result};
use crate::utils::{sha256d, to_hex, ByteReader};
use serde_json::{json, Value};

/// Outpoint index marking a coinbase (newly minted) input.
pub const COINBASE_INDEX: u32 = 0xFFFF_FFFF;

/// Default input sequence; relative-timelock semantics are stored but
/// otherwise unused.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// Reference to a specific output of a prior transaction.
///
/// An all-zero hash with index `0xFFFFFFFF` is the coinbase sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutPoint {
    tx_hash: [u8; 32],
    index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: [u8; 32], index: u32) -> OutPoint {
        OutPoint { tx_hash, index }
    }

    /// The sentinel outpoint used by coinbase inputs.
    pub fn coinbase() -> OutPoint {
        OutPoint {
            tx_hash: [0u8; 32],
            index: COINBASE_INDEX,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.index == COINBASE_INDEX && self.tx_hash == [0u8; 32]
    }

    pub fn get_tx_hash(&self) -> &[u8; 32] {
        &self.tx_hash
    }

    pub fn get_index(&self) -> u32 {
        self.index
    }

    /// Wire form: 32-byte hash followed by the index, little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(36);
        out.extend_from_slice(&self.tx_hash);
        out.extend_from_slice(&self.index.to_le_bytes());
        out
    }

    fn read(reader: &mut ByteReader) -> Result<OutPoint> {
        Ok(OutPoint {
            tx_hash: reader.read_hash()?,
            index: reader.read_u32_le()?,
        })
    }

    // Outpoint hashes are recorded as plain wire-order hex; only
    // block-level hashes use the reversed display convention.
    fn as_record(&self) -> Value {
        json!({
            "tx_hash": to_hex(&self.tx_hash),
            "index": self.index,
        })
    }

    fn from_record(record: &Record) -> Result<OutPoint> {
        Ok(OutPoint {
            tx_hash: field_hash(record, "tx_hash", false)?,
            index: field_u32(record, "index")?,
        })
    }
}

/// Transaction input: the outpoint being spent, the unlocking script
/// that proves the right to spend it, and the sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    outpoint: OutPoint,
    script_sig: Vec<u8>,
    sequence: u32,
}

impl TxInput {
    pub fn new(outpoint: OutPoint, script_sig: Vec<u8>, sequence: u32) -> TxInput {
        TxInput {
            outpoint,
            script_sig,
            sequence,
        }
    }

    pub fn get_outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    pub fn get_script_sig(&self) -> &[u8] {
        self.script_sig.as_slice()
    }

    pub fn get_sequence(&self) -> u32 {
        self.sequence
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.outpoint.to_bytes();
        out.extend_from_slice(&crate::utils::encode_varint(self.script_sig.len() as u64));
        out.extend_from_slice(&self.script_sig);
        out.extend_from_slice(&self.sequence.to_le_bytes());
        out
    }

    fn read(reader: &mut ByteReader) -> Result<TxInput> {
        let outpoint = OutPoint::read(reader)?;
        let script_len = reader.read_varint()?;
        let script_sig = reader.read_bytes(script_len as usize)?.to_vec();
        let sequence = reader.read_u32_le()?;
        Ok(TxInput {
            outpoint,
            script_sig,
            sequence,
        })
    }

    fn as_record(&self) -> Value {
        json!({
            "outpoint": self.outpoint.as_record(),
            "script_sig": to_hex(&self.script_sig),
            "sequence": self.sequence,
        })
    }

    fn from_record(record: &Record) -> Result<TxInput> {
        Ok(TxInput {
            outpoint: OutPoint::from_record(field_object(record, "outpoint")?)?,
            script_sig: field_hex(record, "script_sig")?,
            sequence: field_u32(record, "sequence")?,
        })
    }
}

/// Transaction output: a value in the smallest currency unit and the
/// locking script encoding the spending condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    value: u64,
    script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: u64, script_pubkey: Vec<u8>) -> TxOutput {
        TxOutput {
            value,
            script_pubkey,
        }
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_script_pubkey(&self) -> &[u8] {
        self.script_pubkey.as_slice()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(9 + self.script_pubkey.len());
        out.extend_from_slice(&self.value.to_le_bytes());
        out.extend_from_slice(&crate::utils::encode_varint(self.script_pubkey.len() as u64));
        out.extend_from_slice(&self.script_pubkey);
        out
    }

    fn read(reader: &mut ByteReader) -> Result<TxOutput> {
        let value = reader.read_u64_le()?;
        let script_len = reader.read_varint()?;
        let script_pubkey = reader.read_bytes(script_len as usize)?.to_vec();
        Ok(TxOutput {
            value,
            script_pubkey,
        })
    }

    fn as_record(&self) -> Value {
        json!({
            "value": self.value,
            "script_pubkey": to_hex(&self.script_pubkey),
        })
    }

    fn from_record(record: &Record) -> Result<TxOutput> {
        Ok(TxOutput {
            value: field_u64(record, "value")?,
            script_pubkey: field_hex(record, "script_pubkey")?,
        })
    }
}

/// A transaction: version, ordered inputs and outputs, and a locktime.
///
/// Its sha256d content hash is the transaction's identity, used verbatim
/// as an outpoint reference and as a merkle leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    version: u32,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
    locktime: u32,
}

impl Transaction {
    pub fn new(
        version: u32,
        inputs: Vec<TxInput>,
        outputs: Vec<TxOutput>,
        locktime: u32,
    ) -> Transaction {
        Transaction {
            version,
            inputs,
            outputs,
            locktime,
        }
    }

    /// Build a coinbase transaction: a single input spending the
    /// sentinel outpoint, carrying arbitrary auxiliary data (block
    /// height, or the genesis message) in its unlocking-script field,
    /// and a single output paying the reward to the destination script.
    pub fn new_coinbase(aux_data: Vec<u8>, reward: u64, script_pubkey: Vec<u8>) -> Transaction {
        let input = TxInput::new(OutPoint::coinbase(), aux_data, SEQUENCE_FINAL);
        let output = TxOutput::new(reward, script_pubkey);
        Transaction {
            version: 1,
            inputs: vec![input],
            outputs: vec![output],
            locktime: 0,
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].outpoint.is_coinbase()
    }

    pub fn get_version(&self) -> u32 {
        self.version
    }

    pub fn get_inputs(&self) -> &[TxInput] {
        self.inputs.as_slice()
    }

    pub fn get_outputs(&self) -> &[TxOutput] {
        self.outputs.as_slice()
    }

    pub fn get_locktime(&self) -> u32 {
        self.locktime
    }

    /// Canonical wire encoding:
    /// `version || count(inputs) || inputs || count(outputs) || outputs || locktime`,
    /// all multi-byte integers little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&crate::utils::encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            out.extend_from_slice(&input.to_bytes());
        }
        out.extend_from_slice(&crate::utils::encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            out.extend_from_slice(&output.to_bytes());
        }
        out.extend_from_slice(&self.locktime.to_le_bytes());
        out
    }

    /// Decode a transaction from its wire encoding, requiring that the
    /// input is consumed exactly.
    pub fn from_bytes(bytes: &[u8]) -> Result<Transaction> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(LedgerError::Format(format!(
                "Trailing bytes after transaction: {} remain",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub(crate) fn read(reader: &mut ByteReader) -> Result<Transaction> {
        let version = reader.read_u32_le()?;
        let input_count = reader.read_varint()?;
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            inputs.push(TxInput::read(reader)?);
        }
        let output_count = reader.read_varint()?;
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            outputs.push(TxOutput::read(reader)?);
        }
        let locktime = reader.read_u32_le()?;
        Ok(Transaction {
            version,
            inputs,
            outputs,
            locktime,
        })
    }

    /// Content hash: sha256d of the wire encoding.
    pub fn hash(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    pub fn as_record(&self) -> Value {
        json!({
            "version": self.version,
            "tx_ins": self.inputs.iter().map(|i| i.as_record()).collect::<Vec<_>>(),
            "tx_outs": self.outputs.iter().map(|o| o.as_record()).collect::<Vec<_>>(),
            "locktime": self.locktime,
        })
    }

    pub fn from_record(value: &Value) -> Result<Transaction> {
        let record = as_object(value, "transaction")?;
        let mut inputs = Vec::new();
        for entry in field_array(record, "tx_ins")? {
            inputs.push(TxInput::from_record(as_object(entry, "tx_ins")?)?);
        }
        let mut outputs = Vec::new();
        for entry in field_array(record, "tx_outs")? {
            outputs.push(TxOutput::from_record(as_object(entry, "tx_outs")?)?);
        }
        Ok(Transaction {
            version: field_u32(record, "version")?,
            inputs,
            outputs,
            locktime: field_u32(record, "locktime")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        let outpoint = OutPoint::new([0xAA; 32], 1);
        let input = TxInput::new(outpoint, vec![0x51], SEQUENCE_FINAL);
        let output = TxOutput::new(5000, vec![0x76, 0xA9]);
        Transaction::new(1, vec![input], vec![output], 0)
    }

    #[test]
    fn test_wire_layout_golden() {
        let tx = sample_tx();
        let bytes = tx.to_bytes();

        // version
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        // one input
        assert_eq!(bytes[4], 1);
        // outpoint hash + index
        assert_eq!(&bytes[5..37], &[0xAA; 32]);
        assert_eq!(&bytes[37..41], &[1, 0, 0, 0]);
        // script_sig length + body
        assert_eq!(bytes[41], 1);
        assert_eq!(bytes[42], 0x51);
        // sequence
        assert_eq!(&bytes[43..47], &[0xFF, 0xFF, 0xFF, 0xFF]);
        // one output: value(8) || len || script
        assert_eq!(bytes[47], 1);
        assert_eq!(&bytes[48..56], &5000u64.to_le_bytes());
        assert_eq!(bytes[56], 2);
        assert_eq!(&bytes[57..59], &[0x76, 0xA9]);
        // locktime
        assert_eq!(&bytes[59..63], &[0, 0, 0, 0]);
        assert_eq!(bytes.len(), 63);
    }

    #[test]
    fn test_binary_round_trip() {
        let tx = sample_tx();
        let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = sample_tx().to_bytes();
        bytes.push(0);
        assert!(Transaction::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_hash_is_stable() {
        let tx = sample_tx();
        assert_eq!(tx.hash(), tx.hash());
        assert_eq!(tx.hash(), sample_tx().hash());
    }

    #[test]
    fn test_hash_changes_with_fields() {
        let tx = sample_tx();
        let other = Transaction::new(
            2,
            tx.get_inputs().to_vec(),
            tx.get_outputs().to_vec(),
            tx.get_locktime(),
        );
        assert_ne!(tx.hash(), other.hash());
    }

    #[test]
    fn test_record_round_trip() {
        let tx = sample_tx();
        let decoded = Transaction::from_record(&tx.as_record()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_record_missing_field() {
        let mut value = sample_tx().as_record();
        value.as_object_mut().unwrap().remove("locktime");
        let err = Transaction::from_record(&value).unwrap_err();
        assert!(err.to_string().contains("locktime"));
    }

    #[test]
    fn test_coinbase_sentinel() {
        let tx = Transaction::new_coinbase(vec![0x01, 0x02], 50, vec![0xAC]);
        assert!(tx.is_coinbase());
        assert_eq!(tx.get_inputs().len(), 1);
        assert!(tx.get_inputs()[0].get_outpoint().is_coinbase());
        assert_eq!(tx.get_inputs()[0].get_sequence(), SEQUENCE_FINAL);

        let normal = sample_tx();
        assert!(!normal.is_coinbase());
    }

    #[test]
    fn test_outpoint_wire_form() {
        let outpoint = OutPoint::coinbase();
        let bytes = outpoint.to_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[0..32], &[0u8; 32]);
        assert_eq!(&bytes[32..36], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }
}
