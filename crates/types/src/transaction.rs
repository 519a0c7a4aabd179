use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressError, ShardId};
use crate::hash::TxHash;
use crate::keccak256;
use crate::ssz::{self, CodecError};

/// Maximum number of call-data or deployment-payload bytes in a transaction.
pub const MAX_DATA_BYTES: usize = 24_576;
/// Maximum number of auth-data (signature payload) bytes.
pub const MAX_AUTH_DATA_BYTES: usize = 256;

/// The semantic content of a transaction before authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Whether this transaction instantiates new code at `to`.
    pub deploy: bool,
    /// Destination; for deployments, the address the new code will occupy.
    pub to: Address,
    pub chain_id: u64,
    /// Per-account monotonic sequence number (replay protection).
    pub seqno: u64,
    /// Call data or deployment payload, at most [`MAX_DATA_BYTES`].
    pub data: Vec<u8>,
    /// Resource budget the sender authorizes to be spent.
    pub fee_credit: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
}

impl UnsignedTransaction {
    /// The digest handed to a signer: keccak-256 of the unsigned encoding.
    /// Never the same value as the transaction identifier, which commits to
    /// the signed encoding.
    pub fn signing_hash(&self) -> Result<[u8; 32], CodecError> {
        Ok(keccak256(&ssz::encode_unsigned(self)?))
    }

    /// Attach auth data, producing the signed container.
    pub fn into_signed(self, auth_data: Vec<u8>) -> SignedTransaction {
        SignedTransaction {
            tx: self,
            auth_data,
        }
    }
}

/// An authorized transaction: the unsigned content plus opaque auth data
/// (a signature or concatenated multi-signature payload).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    #[serde(flatten)]
    pub tx: UnsignedTransaction,
    pub auth_data: Vec<u8>,
}

impl SignedTransaction {
    /// Serialize into the wire format accepted by the ledger.
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        ssz::encode_signed(self)
    }

    /// The 22-byte identifier of this transaction on the wire.
    pub fn hash(&self) -> Result<TxHash, CodecError> {
        Ok(TxHash::of_encoded(self.tx.to.shard_id(), &self.encode()?))
    }
}

/// Everything needed to deploy code: the target shard, a caller-chosen
/// salt, and the init code (bytecode with any constructor arguments already
/// appended by the compiler tooling).
///
/// The destination address is a pure function of these fields, so it can be
/// computed and funded before the deploying transaction is ever signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentData {
    pub shard_id: ShardId,
    pub salt: U256,
    pub bytecode: Vec<u8>,
}

impl DeploymentData {
    pub fn new(shard_id: ShardId, salt: U256, bytecode: Vec<u8>) -> Self {
        Self {
            shard_id,
            salt,
            bytecode,
        }
    }

    /// The address the deployed code will occupy.
    pub fn address(&self) -> Result<Address, AddressError> {
        Address::from_deployment(self.shard_id, self.salt, keccak256(&self.bytecode))
    }

    /// The transaction payload: init code followed by the 32-byte salt.
    pub fn payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytecode.len() + 32);
        out.extend_from_slice(&self.bytecode);
        out.extend_from_slice(&self.salt.to_be_bytes::<32>());
        out
    }
}
