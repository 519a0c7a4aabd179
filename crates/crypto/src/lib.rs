//! Signing capability for the sharded-ledger client.
//!
//! The envelope layer depends only on the narrow [`Signer`] trait; the
//! concrete schemes here (a single secp256k1 key, a concatenating
//! multi-key signer) are interchangeable implementations of it.

pub mod local;
pub mod multi;

pub use local::LocalKeySigner;
pub use multi::MultiKeySigner;

use shardnet_types::MAX_AUTH_DATA_BYTES;

/// Errors produced by signer implementations.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("signing failed: {0}")]
    Signature(#[from] k256::ecdsa::Error),
    #[error("auth data is {len} bytes, exceeding the {max}-byte limit")]
    AuthDataTooLong { len: usize, max: usize },
}

/// A capability that authorizes transactions.
///
/// The transaction schema places a single constraint on implementations:
/// the signature payload must fit in the [`MAX_AUTH_DATA_BYTES`] auth-data
/// field. The payload is otherwise opaque to the codec.
pub trait Signer: Send + Sync {
    /// Sign a 32-byte digest, returning the auth-data payload.
    fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError>;

    /// The public key corresponding to this signer.
    fn public_key(&self) -> Vec<u8>;
}

pub(crate) fn check_auth_data_len(len: usize) -> Result<(), SignerError> {
    if len > MAX_AUTH_DATA_BYTES {
        return Err(SignerError::AuthDataTooLong {
            len,
            max: MAX_AUTH_DATA_BYTES,
        });
    }
    Ok(())
}
