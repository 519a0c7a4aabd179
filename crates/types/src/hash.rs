use serde::{Deserialize, Serialize};

use crate::address::{AddressError, ShardId, SHARD_ID_BYTES};
use crate::keccak256;

/// Number of raw bytes in a transaction identifier: a 2-byte shard id
/// followed by 20 bytes of the keccak-256 of the signed encoding.
pub const TX_HASH_BYTES: usize = 22;
/// Expected string length of an encoded identifier (`0x` + 44 hex chars).
pub const TX_HASH_STRING_LENGTH: usize = 2 + TX_HASH_BYTES * 2;

/// The wire identifier of a submitted transaction.
///
/// Distinct from the signing digest: the identifier commits to the signed
/// encoding (auth data included), the signing digest to the unsigned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxHash(pub [u8; TX_HASH_BYTES]);

impl TxHash {
    /// Compute the identifier of an encoded signed transaction.
    pub fn of_encoded(shard_id: ShardId, encoded_signed_tx: &[u8]) -> Self {
        let digest = keccak256(encoded_signed_tx);
        let mut raw = [0u8; TX_HASH_BYTES];
        raw[..SHARD_ID_BYTES].copy_from_slice(&shard_id.to_be_bytes());
        raw[SHARD_ID_BYTES..].copy_from_slice(&digest[32 - (TX_HASH_BYTES - SHARD_ID_BYTES)..]);
        TxHash(raw)
    }

    /// The shard the identified transaction was sent to.
    pub fn shard_id(&self) -> ShardId {
        ShardId::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_BYTES] {
        &self.0
    }

    /// Parse a `0x`-prefixed hex identifier string.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        if !s.starts_with("0x") {
            return Err(AddressError::InvalidPrefix);
        }
        if s.len() != TX_HASH_STRING_LENGTH {
            return Err(AddressError::InvalidLength {
                expected: TX_HASH_STRING_LENGTH,
                actual: s.len(),
            });
        }
        let mut raw = [0u8; TX_HASH_BYTES];
        hex::decode_to_slice(&s[2..], &mut raw)?;
        Ok(TxHash(raw))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; TX_HASH_BYTES]> for TxHash {
    fn from(value: [u8; TX_HASH_BYTES]) -> Self {
        TxHash(value)
    }
}

impl From<TxHash> for String {
    fn from(value: TxHash) -> Self {
        value.to_hex()
    }
}

impl TryFrom<String> for TxHash {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TxHash::from_hex(&value)
    }
}
