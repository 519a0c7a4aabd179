use alloy_primitives::U256;
use async_trait::async_trait;

use shardnet_crypto::Signer;
use shardnet_types::{
    CodecError, DeploymentData, SignedTransaction, TxHash, UnsignedTransaction, MAX_DATA_BYTES,
};

use crate::error::SdkError;

/// Fee credit attached to deployment transactions when the caller does not
/// size one from the shard's gas price.
pub const DEFAULT_DEPLOY_FEE_CREDIT: u64 = 5_000_000_000_000;

/// The raw-submission endpoint of the ledger, pulled out as a capability so
/// envelope submission can be exercised against stub ledgers.
#[async_trait]
pub trait RawTransactionSender {
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, SdkError>;
}

/// Assembles one transaction end to end: unsigned content in, signature
/// attached via a [`Signer`], encoded bytes and identifier out.
///
/// The envelope is consumed by submission; all later state lives in
/// receipts fetched fresh from the ledger.
#[derive(Debug, Clone)]
pub struct TransactionEnvelope {
    tx: UnsignedTransaction,
    auth_data: Option<Vec<u8>>,
}

impl TransactionEnvelope {
    pub fn new(tx: UnsignedTransaction) -> Result<Self, SdkError> {
        if tx.data.len() > MAX_DATA_BYTES {
            return Err(CodecError::FieldTooLarge {
                field: "data",
                len: tx.data.len(),
                max: MAX_DATA_BYTES,
            }
            .into());
        }
        Ok(Self {
            tx,
            auth_data: None,
        })
    }

    /// Build a deployment envelope. The destination address is derived from
    /// the deployment data before any signature exists, so it can be funded
    /// ahead of submission.
    pub fn deployment(deploy: &DeploymentData, chain_id: u64) -> Result<Self, SdkError> {
        let fee_credit = U256::from(DEFAULT_DEPLOY_FEE_CREDIT);
        Self::new(UnsignedTransaction {
            deploy: true,
            to: deploy.address()?,
            chain_id,
            seqno: 0,
            data: deploy.payload(),
            fee_credit,
            max_priority_fee_per_gas: U256::ZERO,
            max_fee_per_gas: fee_credit,
        })
    }

    pub fn transaction(&self) -> &UnsignedTransaction {
        &self.tx
    }

    pub fn is_signed(&self) -> bool {
        self.auth_data.is_some()
    }

    /// The digest a signer authorizes: keccak-256 of the unsigned encoding.
    pub fn signing_hash(&self) -> Result<[u8; 32], SdkError> {
        Ok(self.tx.signing_hash()?)
    }

    /// Sign the envelope, storing the auth data. Re-signing overwrites the
    /// previous auth data.
    pub fn sign(&mut self, signer: &dyn Signer) -> Result<(), SdkError> {
        let digest = self.signing_hash()?;
        self.auth_data = Some(signer.sign(&digest)?);
        Ok(())
    }

    fn signed(&self) -> Result<SignedTransaction, SdkError> {
        let auth_data = self.auth_data.clone().ok_or(SdkError::NotSigned)?;
        Ok(self.tx.clone().into_signed(auth_data))
    }

    /// Serialize the signed transaction into its wire format.
    pub fn encode(&self) -> Result<Vec<u8>, SdkError> {
        Ok(self.signed()?.encode()?)
    }

    /// The 22-byte identifier of the signed transaction. Computed from the
    /// signed encoding alone; independent of the signing digest.
    pub fn hash(&self) -> Result<TxHash, SdkError> {
        Ok(self.signed()?.hash()?)
    }

    /// Submit the envelope, consuming it.
    ///
    /// The identifier returned by the ledger must equal the locally
    /// computed one; a mismatch means a codec bug or a tampered submission
    /// path and is surfaced as [`SdkError::HashMismatch`].
    pub async fn submit<S: RawTransactionSender + Sync>(
        self,
        sender: &S,
    ) -> Result<TxHash, SdkError> {
        let local = self.hash()?;
        let remote = sender.send_raw_transaction(&self.encode()?).await?;
        if remote != local {
            return Err(SdkError::HashMismatch { local, remote });
        }
        Ok(remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardnet_crypto::LocalKeySigner;
    use shardnet_types::Address;

    fn sample_envelope() -> TransactionEnvelope {
        TransactionEnvelope::new(UnsignedTransaction {
            deploy: false,
            to: Address::from_hex("0x0001111111111111111111111111111111111111").unwrap(),
            chain_id: 1,
            seqno: 3,
            data: vec![0xAB, 0xCD],
            fee_credit: U256::from(100_000u64),
            max_priority_fee_per_gas: U256::ZERO,
            max_fee_per_gas: U256::from(100_000u64),
        })
        .unwrap()
    }

    #[test]
    fn encode_and_hash_require_a_signature() {
        let envelope = sample_envelope();
        assert!(!envelope.is_signed());
        assert!(matches!(envelope.encode(), Err(SdkError::NotSigned)));
        assert!(matches!(envelope.hash(), Err(SdkError::NotSigned)));
    }

    #[test]
    fn signing_attaches_verifiable_auth_data() {
        let signer = LocalKeySigner::random();
        let mut envelope = sample_envelope();
        let digest = envelope.signing_hash().unwrap();

        envelope.sign(&signer).unwrap();
        assert!(envelope.is_signed());

        let signed = envelope.signed().unwrap();
        assert!(signer.verify(&digest, &signed.auth_data));
        // Signing-digest vs identifier separation holds through the envelope.
        assert_ne!(&envelope.hash().unwrap().as_bytes()[2..], &digest[12..]);
    }

    #[test]
    fn re_signing_overwrites_auth_data() {
        let mut envelope = sample_envelope();
        envelope.sign(&LocalKeySigner::random()).unwrap();
        let first = envelope.signed().unwrap().auth_data;
        envelope.sign(&LocalKeySigner::random()).unwrap();
        assert_ne!(envelope.signed().unwrap().auth_data, first);
    }

    #[test]
    fn oversized_data_rejected_at_construction() {
        let mut tx = sample_envelope().transaction().clone();
        tx.data = vec![0u8; MAX_DATA_BYTES + 1];
        assert!(matches!(
            TransactionEnvelope::new(tx),
            Err(SdkError::Codec(CodecError::FieldTooLarge { .. }))
        ));
    }

    #[test]
    fn deployment_envelope_derives_destination() {
        let deploy = DeploymentData::new(2, U256::from(100u64), vec![0x60, 0x80]);
        let envelope = TransactionEnvelope::deployment(&deploy, 1).unwrap();
        let tx = envelope.transaction();
        assert!(tx.deploy);
        assert_eq!(tx.seqno, 0);
        assert_eq!(tx.to, deploy.address().unwrap());
        assert_eq!(tx.to.shard_id(), 2);
        assert_eq!(tx.data, deploy.payload());
        assert_eq!(tx.fee_credit, U256::from(DEFAULT_DEPLOY_FEE_CREDIT));
    }

    struct EchoSender;

    #[async_trait]
    impl RawTransactionSender for EchoSender {
        async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, SdkError> {
            let decoded = shardnet_types::ssz::decode_signed(encoded)?;
            Ok(decoded.hash()?)
        }
    }

    struct LyingSender;

    #[async_trait]
    impl RawTransactionSender for LyingSender {
        async fn send_raw_transaction(&self, _encoded: &[u8]) -> Result<TxHash, SdkError> {
            Ok(TxHash([0xEE; shardnet_types::TX_HASH_BYTES]))
        }
    }

    #[tokio::test]
    async fn submit_checks_the_returned_identifier() {
        let signer = LocalKeySigner::random();

        let mut envelope = sample_envelope();
        envelope.sign(&signer).unwrap();
        let expected = envelope.hash().unwrap();
        assert_eq!(envelope.submit(&EchoSender).await.unwrap(), expected);

        let mut envelope = sample_envelope();
        envelope.sign(&signer).unwrap();
        assert!(matches!(
            envelope.submit(&LyingSender).await,
            Err(SdkError::HashMismatch { .. })
        ));
    }
}
