use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::keccak256;

/// Errors that can occur when deriving or parsing an address.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("shard id 0 is reserved for the main shard")]
    InvalidShardId,
    #[error("address must start with '0x'")]
    InvalidPrefix,
    #[error("address must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("address payload is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 20;
/// Number of leading address bytes that carry the owning shard id.
pub const SHARD_ID_BYTES: usize = 2;
/// Expected string length of an encoded address (`0x` + 40 hex chars).
pub const ADDRESS_STRING_LENGTH: usize = 2 + ADDRESS_BYTES * 2;

/// Identifier of a ledger shard. Shard 0 is the coordinating main shard.
pub type ShardId = u16;

/// The coordinating shard that references blocks of every other shard.
pub const MAIN_SHARD_ID: ShardId = 0;

/// A 20-byte account address whose first two bytes encode the owning shard
/// id as a big-endian `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl Address {
    /// Derive the address of an externally-owned account from its
    /// uncompressed public key.
    ///
    /// The low 18 bytes of `keccak256(pub_key)` are prefixed with the
    /// big-endian shard id. Shard 0 is rejected: externally-owned accounts
    /// never live on the main shard.
    pub fn from_public_key(pub_key: &[u8], shard_id: ShardId) -> Result<Self, AddressError> {
        if shard_id == MAIN_SHARD_ID {
            return Err(AddressError::InvalidShardId);
        }
        Ok(Self::from_digest(shard_id, keccak256(pub_key)))
    }

    /// Derive the address a deployment will occupy, before the deploying
    /// transaction exists.
    ///
    /// The preimage is the 32-byte big-endian salt followed by the hash of
    /// the init code, so the result depends only on what is deployed and
    /// where, never on transaction ordering.
    pub fn from_deployment(
        shard_id: ShardId,
        salt: U256,
        init_code_hash: [u8; 32],
    ) -> Result<Self, AddressError> {
        if shard_id == MAIN_SHARD_ID {
            return Err(AddressError::InvalidShardId);
        }
        let mut preimage = [0u8; 64];
        preimage[..32].copy_from_slice(&salt.to_be_bytes::<32>());
        preimage[32..].copy_from_slice(&init_code_hash);
        Ok(Self::from_digest(shard_id, keccak256(&preimage)))
    }

    fn from_digest(shard_id: ShardId, digest: [u8; 32]) -> Self {
        let mut raw = [0u8; ADDRESS_BYTES];
        raw[..SHARD_ID_BYTES].copy_from_slice(&shard_id.to_be_bytes());
        raw[SHARD_ID_BYTES..].copy_from_slice(&digest[32 - (ADDRESS_BYTES - SHARD_ID_BYTES)..]);
        Address(raw)
    }

    /// The shard this address lives on.
    pub fn shard_id(&self) -> ShardId {
        ShardId::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Parse a `0x`-prefixed hex address string.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        if !s.starts_with("0x") {
            return Err(AddressError::InvalidPrefix);
        }
        if s.len() != ADDRESS_STRING_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_STRING_LENGTH,
                actual: s.len(),
            });
        }
        let mut raw = [0u8; ADDRESS_BYTES];
        hex::decode_to_slice(&s[2..], &mut raw)?;
        Ok(Address(raw))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::from_hex(&value)
    }
}
