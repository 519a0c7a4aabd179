//! Core data layer for the sharded-ledger client: addresses, transaction
//! containers and their canonical SSZ encoding, transaction identifiers,
//! and execution receipts. This crate is pure data; nothing here performs
//! I/O or holds keys.

pub mod address;
pub mod hash;
pub mod receipt;
pub mod ssz;
pub mod transaction;

pub use alloy_primitives::U256;

pub use address::*;
pub use hash::*;
pub use receipt::*;
pub use ssz::CodecError;
pub use transaction::*;

use sha3::{Digest, Keccak256};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}
