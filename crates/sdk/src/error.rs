use shardnet_types::TxHash;
use thiserror::Error;

/// Errors that can occur when building, submitting, or tracking
/// transactions against a ledger node.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rpc error (code {code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Codec(#[from] shardnet_types::CodecError),
    #[error(transparent)]
    Address(#[from] shardnet_types::AddressError),
    #[error(transparent)]
    Signer(#[from] shardnet_crypto::SignerError),
    #[error("transaction has not been signed")]
    NotSigned,
    #[error("ledger returned identifier {remote}, locally computed {local}")]
    HashMismatch { local: TxHash, remote: TxHash },
    #[error("faucet top-up did not complete after {retries} attempts")]
    TopUpFailed { retries: u32 },
}

impl SdkError {
    pub(crate) fn parse_error(msg: impl Into<String>) -> Self {
        SdkError::Parse(msg.into())
    }

    pub(crate) fn rpc_error(code: i64, message: impl Into<String>) -> Self {
        SdkError::Rpc {
            code,
            message: message.into(),
        }
    }
}
