//! Difficulty engine: compact "bits" representation of the 256-bit
//! proof-of-work target, and the periodic retarget computed from
//! historical block timestamps.

use crate::config::ChainParams;
use crate::core::Block;
use crate::error::{LedgerError, Result};
use log::info;
use num_bigint::BigUint;

const MIN_EXPONENT: u32 = 3;
const MAX_EXPONENT: u32 = 31;
const MIN_MANTISSA: u32 = 0x8000;
const MAX_MANTISSA: u32 = 0x7F_FFFF;

/// Expand a compact bits value into the full target.
///
/// The top byte is an exponent, the low 24 bits a mantissa:
/// `target = mantissa << (8 * (exponent - 3))`. Out-of-range fields are
/// rejected rather than clamped.
pub fn bits_to_target(bits: u32) -> Result<BigUint> {
    let exponent = bits >> 24;
    let mantissa = bits & 0x00FF_FFFF;

    if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
        return Err(LedgerError::Format(format!(
            "Compact bits exponent {exponent:#x} outside valid range [{MIN_EXPONENT:#x}, {MAX_EXPONENT:#x}]"
        )));
    }
    if !(MIN_MANTISSA..=MAX_MANTISSA).contains(&mantissa) {
        return Err(LedgerError::Format(format!(
            "Compact bits mantissa {mantissa:#x} outside valid range [{MIN_MANTISSA:#x}, {MAX_MANTISSA:#x}]"
        )));
    }

    Ok(BigUint::from(mantissa) << (8 * (exponent - MIN_EXPONENT)))
}

/// Compress a target back into compact bits.
///
/// Exponent is the count of significant big-endian bytes, mantissa the
/// leading three. A mantissa with its top bit set would collide with the
/// compact format's sign bit, so it is shifted down a byte and the
/// exponent bumped. Low-order bits beyond the mantissa are truncated.
pub fn target_to_bits(target: &BigUint) -> u32 {
    let bytes = target.to_bytes_be();
    if bytes == [0] {
        return 0;
    }

    let mut exponent = bytes.len() as u32;
    let mut mantissa: u32 = 0;
    for i in 0..3 {
        mantissa = (mantissa << 8) | bytes.get(i).copied().unwrap_or(0) as u32;
    }
    if mantissa & 0x0080_0000 != 0 {
        mantissa >>= 8;
        exponent += 1;
    }

    (exponent << 24) | mantissa
}

/// The easiest-allowed target; retargets never exceed it.
pub fn max_target(params: &ChainParams) -> Result<BigUint> {
    bits_to_target(params.max_target_bits)
}

/// Target for the block following the given history.
///
/// At exact multiples of the retarget interval, the actual timespan over
/// the last `interval - 1` blocks is clamped to a quarter/quadruple of
/// the expected timespan and used to rescale the current target; the
/// result is capped at the max target and truncated to compact
/// precision. Off-boundary, the previous block's target carries over
/// unchanged.
pub fn next_target(blocks: &[Block], params: &ChainParams) -> Result<BigUint> {
    let last = match blocks.last() {
        Some(block) => block,
        None => return bits_to_target(params.initial_bits),
    };

    if params.retarget_interval < 2 || blocks.len() % params.retarget_interval != 0 {
        return bits_to_target(last.get_bits());
    }

    let first = &blocks[blocks.len() - (params.retarget_interval - 1)];
    let current_target = bits_to_target(last.get_bits())?;

    let expected = params.expected_timespan as u64;
    let actual = (last.get_timestamp() as u64)
        .saturating_sub(first.get_timestamp() as u64)
        .clamp(expected / 4, expected * 4);

    let rescaled = (&current_target * BigUint::from(actual)) / BigUint::from(expected);
    let capped = rescaled.min(max_target(params)?);

    // Truncate to representable compact precision before use
    let new_target = bits_to_target(target_to_bits(&capped))?;

    info!(
        "Retarget at height {}: actual timespan {actual}s vs expected {expected}s, bits {:#010x} -> {:#010x}",
        blocks.len(),
        last.get_bits(),
        target_to_bits(&new_target),
    );

    Ok(new_target)
}
