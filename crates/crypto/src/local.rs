use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, SigningKey};
use rand_core::OsRng;

use shardnet_types::{Address, AddressError, ShardId};

use crate::{Signer, SignerError};

/// Length of a recoverable secp256k1 signature: `r || s || v`.
pub const SIGNATURE_BYTES: usize = 65;

/// A signer backed by a single in-memory secp256k1 key.
///
/// Produces 65-byte recoverable signatures over the signing digest and
/// exposes the uncompressed (65-byte, `0x04`-prefixed) public key, which is
/// also the address-derivation preimage.
#[derive(Clone)]
pub struct LocalKeySigner {
    signing_key: SigningKey,
}

impl LocalKeySigner {
    pub fn from_private_key(private_key: &[u8; 32]) -> Result<Self, SignerError> {
        let signing_key =
            SigningKey::from_slice(private_key).map_err(|_| SignerError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Parse a private key from a hex string, with or without a `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let raw = private_key.strip_prefix("0x").unwrap_or(private_key);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| SignerError::InvalidPrivateKey)?;
        Self::from_private_key(&bytes)
    }

    /// Generate a fresh random key.
    pub fn random() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// The address of this key's account on the given shard.
    pub fn address(&self, shard_id: ShardId) -> Result<Address, AddressError> {
        Address::from_public_key(&self.public_key(), shard_id)
    }

    /// Check a signature produced by [`Signer::sign`] against a digest.
    pub fn verify(&self, digest: &[u8; 32], signature: &[u8]) -> bool {
        if signature.len() != SIGNATURE_BYTES {
            return false;
        }
        let Ok(sig) = Signature::from_slice(&signature[..64]) else {
            return false;
        };
        self.signing_key
            .verifying_key()
            .verify_prehash(digest, &sig)
            .is_ok()
    }
}

impl Signer for LocalKeySigner {
    fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError> {
        let (signature, recovery_id) = self.signing_key.sign_prehash_recoverable(digest)?;
        let mut out = Vec::with_capacity(SIGNATURE_BYTES);
        out.extend_from_slice(&signature.to_bytes());
        out.push(recovery_id.to_byte());
        Ok(out)
    }

    fn public_key(&self) -> Vec<u8> {
        self.signing_key
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("LocalKeySigner").finish_non_exhaustive()
    }
}
