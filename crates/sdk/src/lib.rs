//! Client layer for the sharded ledger: JSON-RPC access to a node, the
//! transaction envelope pipeline, receipt-completion tracking, and the
//! faucet client.
//!
//! The typical flow is linear per transaction: build a
//! [`TransactionEnvelope`], sign it with a `shardnet-crypto` signer, submit
//! it through a [`PublicClient`], then hand the returned identifier to
//! [`wait_till_completed`] to block until every cross-shard effect has
//! resolved.

mod client;
mod envelope;
mod error;
mod faucet;
mod tracker;

pub use client::{BlockTag, PublicClient};
pub use envelope::{RawTransactionSender, TransactionEnvelope, DEFAULT_DEPLOY_FEE_CREDIT};
pub use error::SdkError;
pub use faucet::FaucetClient;
pub use tracker::{wait_till_completed, ReceiptFetcher, WaitOptions};
