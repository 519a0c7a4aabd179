//! Canonical SSZ container encoding of the transaction schemas.
//!
//! Field order is part of the wire contract: fixed-size fields appear in
//! declaration order with little-endian integers, and each variable-size
//! field is replaced in the fixed part by a 4-byte offset into the tail.
//! The hash of these bytes is the cryptographic commitment a user signs,
//! so two implementations must agree byte for byte.

use alloy_primitives::U256;

use crate::address::{Address, ADDRESS_BYTES};
use crate::transaction::{
    SignedTransaction, UnsignedTransaction, MAX_AUTH_DATA_BYTES, MAX_DATA_BYTES,
};

/// Size of an SSZ offset word.
const BYTES_PER_OFFSET: usize = 4;

/// Fixed part of the unsigned container:
/// `bool + 3 * u256 + bytes20 + 2 * u64 + offset(data)`.
pub const UNSIGNED_FIXED_BYTES: usize = 1 + 3 * 32 + ADDRESS_BYTES + 2 * 8 + BYTES_PER_OFFSET;
/// Fixed part of the signed container: one more offset for `auth_data`.
pub const SIGNED_FIXED_BYTES: usize = UNSIGNED_FIXED_BYTES + BYTES_PER_OFFSET;

/// Errors raised by the transaction codec. All of them are fatal to the
/// current operation; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{field} is {len} bytes, exceeding the {max}-byte maximum")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("input truncated: need at least {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),
    #[error("invalid {field} offset {offset}")]
    InvalidOffset { field: &'static str, offset: usize },
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), CodecError> {
    if len > max {
        return Err(CodecError::FieldTooLarge { field, len, max });
    }
    Ok(())
}

fn write_fixed(out: &mut Vec<u8>, tx: &UnsignedTransaction, data_offset: usize) {
    out.push(tx.deploy as u8);
    out.extend_from_slice(&tx.fee_credit.to_le_bytes::<32>());
    out.extend_from_slice(&tx.max_priority_fee_per_gas.to_le_bytes::<32>());
    out.extend_from_slice(&tx.max_fee_per_gas.to_le_bytes::<32>());
    out.extend_from_slice(tx.to.as_bytes());
    out.extend_from_slice(&tx.chain_id.to_le_bytes());
    out.extend_from_slice(&tx.seqno.to_le_bytes());
    out.extend_from_slice(&(data_offset as u32).to_le_bytes());
}

/// Serialize the unsigned container. This is the signing-digest preimage.
pub fn encode_unsigned(tx: &UnsignedTransaction) -> Result<Vec<u8>, CodecError> {
    check_len("data", tx.data.len(), MAX_DATA_BYTES)?;
    let mut out = Vec::with_capacity(UNSIGNED_FIXED_BYTES + tx.data.len());
    write_fixed(&mut out, tx, UNSIGNED_FIXED_BYTES);
    out.extend_from_slice(&tx.data);
    Ok(out)
}

/// Serialize the signed container. This is the wire format, and the
/// preimage of the transaction identifier.
pub fn encode_signed(signed: &SignedTransaction) -> Result<Vec<u8>, CodecError> {
    check_len("data", signed.tx.data.len(), MAX_DATA_BYTES)?;
    check_len("auth_data", signed.auth_data.len(), MAX_AUTH_DATA_BYTES)?;
    let mut out =
        Vec::with_capacity(SIGNED_FIXED_BYTES + signed.tx.data.len() + signed.auth_data.len());
    write_fixed(&mut out, &signed.tx, SIGNED_FIXED_BYTES);
    out.extend_from_slice(&((SIGNED_FIXED_BYTES + signed.tx.data.len()) as u32).to_le_bytes());
    out.extend_from_slice(&signed.tx.data);
    out.extend_from_slice(&signed.auth_data);
    Ok(out)
}

fn read_bool(byte: u8) -> Result<bool, CodecError> {
    match byte {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidBool(other)),
    }
}

fn read_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(raw)
}

fn read_fixed(bytes: &[u8]) -> Result<UnsignedTransaction, CodecError> {
    let mut to = [0u8; ADDRESS_BYTES];
    to.copy_from_slice(&bytes[97..117]);
    Ok(UnsignedTransaction {
        deploy: read_bool(bytes[0])?,
        fee_credit: U256::from_le_slice(&bytes[1..33]),
        max_priority_fee_per_gas: U256::from_le_slice(&bytes[33..65]),
        max_fee_per_gas: U256::from_le_slice(&bytes[65..97]),
        to: Address(to),
        chain_id: read_u64(bytes, 117),
        seqno: read_u64(bytes, 125),
        data: Vec::new(),
    })
}

/// Decode the unsigned container, rejecting malformed or oversized input.
pub fn decode_unsigned(bytes: &[u8]) -> Result<UnsignedTransaction, CodecError> {
    if bytes.len() < UNSIGNED_FIXED_BYTES {
        return Err(CodecError::Truncated {
            needed: UNSIGNED_FIXED_BYTES,
            got: bytes.len(),
        });
    }
    let data_offset = read_u32(bytes, 133);
    if data_offset != UNSIGNED_FIXED_BYTES {
        return Err(CodecError::InvalidOffset {
            field: "data",
            offset: data_offset,
        });
    }
    let data = &bytes[data_offset..];
    check_len("data", data.len(), MAX_DATA_BYTES)?;

    let mut tx = read_fixed(bytes)?;
    tx.data = data.to_vec();
    Ok(tx)
}

/// Decode the signed container, rejecting malformed or oversized input.
pub fn decode_signed(bytes: &[u8]) -> Result<SignedTransaction, CodecError> {
    if bytes.len() < SIGNED_FIXED_BYTES {
        return Err(CodecError::Truncated {
            needed: SIGNED_FIXED_BYTES,
            got: bytes.len(),
        });
    }
    let data_offset = read_u32(bytes, 133);
    if data_offset != SIGNED_FIXED_BYTES {
        return Err(CodecError::InvalidOffset {
            field: "data",
            offset: data_offset,
        });
    }
    let auth_offset = read_u32(bytes, 137);
    if auth_offset < data_offset || auth_offset > bytes.len() {
        return Err(CodecError::InvalidOffset {
            field: "auth_data",
            offset: auth_offset,
        });
    }
    let data = &bytes[data_offset..auth_offset];
    check_len("data", data.len(), MAX_DATA_BYTES)?;
    let auth_data = &bytes[auth_offset..];
    check_len("auth_data", auth_data.len(), MAX_AUTH_DATA_BYTES)?;

    let mut tx = read_fixed(bytes)?;
    tx.data = data.to_vec();
    Ok(SignedTransaction {
        tx,
        auth_data: auth_data.to_vec(),
    })
}
