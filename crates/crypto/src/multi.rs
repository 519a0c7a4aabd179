use crate::local::{LocalKeySigner, SIGNATURE_BYTES};
use crate::{check_auth_data_len, Signer, SignerError};

/// A signer that concatenates the recoverable signatures of several local
/// keys into one auth-data payload.
///
/// The codec treats auth data as opaque bytes, so no schema change is
/// needed; the only constraint is the 256-byte auth-data limit, which caps
/// the scheme at three 65-byte signatures.
#[derive(Debug, Clone)]
pub struct MultiKeySigner {
    signers: Vec<LocalKeySigner>,
}

impl MultiKeySigner {
    pub fn new(signers: Vec<LocalKeySigner>) -> Result<Self, SignerError> {
        check_auth_data_len(signers.len() * SIGNATURE_BYTES)?;
        Ok(Self { signers })
    }

    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    /// Verify that `auth_data` carries one valid signature per key, in key
    /// order.
    pub fn verify(&self, digest: &[u8; 32], auth_data: &[u8]) -> bool {
        if auth_data.len() != self.signers.len() * SIGNATURE_BYTES {
            return false;
        }
        self.signers
            .iter()
            .zip(auth_data.chunks_exact(SIGNATURE_BYTES))
            .all(|(signer, signature)| signer.verify(digest, signature))
    }
}

impl Signer for MultiKeySigner {
    fn sign(&self, digest: &[u8; 32]) -> Result<Vec<u8>, SignerError> {
        let mut out = Vec::with_capacity(self.signers.len() * SIGNATURE_BYTES);
        for signer in &self.signers {
            out.extend_from_slice(&signer.sign(digest)?);
        }
        check_auth_data_len(out.len())?;
        Ok(out)
    }

    /// The public key of the first participant, which anchors the account
    /// address. The remaining keys are carried only in the signatures.
    fn public_key(&self) -> Vec<u8> {
        self.signers
            .first()
            .map(|signer| signer.public_key())
            .unwrap_or_default()
    }
}
