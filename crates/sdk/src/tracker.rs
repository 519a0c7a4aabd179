//! Completion tracking for the causal tree of receipts a transaction
//! spawns across shards.
//!
//! Children of a cross-shard call are unknown until the parent's receipt
//! is fetched, so the tree cannot be pre-enumerated: discovery and polling
//! interleave over an explicit worklist. Each tracked transaction owns its
//! queue and result list; concurrent waits do not interact.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, warn};

use shardnet_types::{Receipt, TxHash};

use crate::error::SdkError;

/// The ledger-query capability the tracker polls. Implemented by the RPC
/// client and by synthetic ledgers in tests.
#[async_trait]
pub trait ReceiptFetcher: Send + Sync {
    /// The receipt of `hash`, or `None` if the ledger has not indexed the
    /// transaction yet.
    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, SdkError>;
}

/// Polling configuration for [`wait_till_completed`].
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Additionally wait until every non-main-shard node's block has been
    /// referenced by the main shard.
    pub wait_till_main_shard: bool,
    /// Backoff between polls of a node that is not yet resolved.
    pub polling_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait_till_main_shard: true,
            polling_interval: Duration::from_millis(1000),
        }
    }
}

/// Poll until the full receipt tree rooted at `hash` has resolved,
/// returning the receipts in breadth-first discovery order: parent before
/// children, siblings in the order the ledger reported them.
///
/// A node blocks the traversal until its receipt exists, its spawned
/// children are all fetched, and (when requested) it has been referenced
/// by the main shard. Transient query failures are retried on the same
/// interval. `success == false` receipts are ordinary results; callers
/// inspect the returned list for execution failures.
///
/// There is no built-in deadline. A caller needing one races this future
/// against a timeout.
pub async fn wait_till_completed<F>(
    fetcher: &F,
    hash: TxHash,
    options: WaitOptions,
) -> Result<Vec<Receipt>, SdkError>
where
    F: ReceiptFetcher + ?Sized,
{
    let mut queue = VecDeque::from([hash]);
    let mut receipts = Vec::new();

    // Peek rather than pop: the head is re-fetched until it resolves, so
    // children are always enqueued from the receipt that passed the checks,
    // never from a stale partial state.
    while let Some(head) = queue.front().copied() {
        let fetched = match fetcher.receipt(head).await {
            Ok(fetched) => fetched,
            Err(err @ (SdkError::Http(_) | SdkError::Rpc { .. })) => {
                warn!(hash = %head, error = %err, "receipt query failed, retrying");
                sleep(options.polling_interval).await;
                continue;
            }
            Err(err) => return Err(err),
        };
        let Some(receipt) = fetched else {
            // Not indexed yet.
            sleep(options.polling_interval).await;
            continue;
        };
        if !receipt.children_resolved() {
            // Execution produced children the ledger has not resolved.
            sleep(options.polling_interval).await;
            continue;
        }
        if options.wait_till_main_shard && !receipt.finalized() {
            sleep(options.polling_interval).await;
            continue;
        }

        queue.pop_front();
        if let Some(children) = &receipt.out_transactions {
            queue.extend(children.iter().copied());
        }
        debug!(hash = %head, children = queue.len(), "receipt resolved");
        receipts.push(receipt);
    }

    Ok(receipts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapLedger {
        receipts: HashMap<TxHash, Receipt>,
    }

    #[async_trait]
    impl ReceiptFetcher for MapLedger {
        async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, SdkError> {
            Ok(self.receipts.get(&hash).cloned())
        }
    }

    fn hash(byte: u8) -> TxHash {
        TxHash([byte; shardnet_types::TX_HASH_BYTES])
    }

    fn node(id: u8, success: bool, children: &[u8]) -> Receipt {
        Receipt {
            success,
            status: None,
            shard_id: 1,
            transaction_hash: hash(id),
            gas_used: 0,
            contract_address: None,
            out_transactions: Some(children.iter().copied().map(hash).collect()),
            output_receipts: Some(children.iter().map(|_| None).collect()),
            included_in_main: true,
        }
    }

    fn resolved(mut receipt: Receipt) -> Receipt {
        // Children fetched, subtrees left to the traversal.
        if let Some(children) = &receipt.out_transactions {
            receipt.output_receipts =
                Some(children.iter().map(|_| Some(node(0, true, &[]))).collect());
        }
        receipt
    }

    #[tokio::test]
    async fn single_node_resolves_on_first_poll() {
        let ledger = MapLedger {
            receipts: HashMap::from([(hash(1), node(1, true, &[]))]),
        };
        let receipts = wait_till_completed(&ledger, hash(1), WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].transaction_hash, hash(1));
    }

    #[tokio::test]
    async fn failed_leaf_is_returned_not_raised() {
        let ledger = MapLedger {
            receipts: HashMap::from([(hash(1), node(1, false, &[]))]),
        };
        let receipts = wait_till_completed(&ledger, hash(1), WaitOptions::default())
            .await
            .unwrap();
        assert_eq!(receipts.len(), 1);
        assert!(!receipts[0].success);
    }

    #[tokio::test]
    async fn traversal_is_breadth_first() {
        // 1 -> (2, 3); 2 -> (4); all resolved from the start.
        let ledger = MapLedger {
            receipts: HashMap::from([
                (hash(1), resolved(node(1, true, &[2, 3]))),
                (hash(2), resolved(node(2, true, &[4]))),
                (hash(3), node(3, true, &[])),
                (hash(4), node(4, true, &[])),
            ]),
        };
        let receipts = wait_till_completed(&ledger, hash(1), WaitOptions::default())
            .await
            .unwrap();
        let order: Vec<TxHash> = receipts.iter().map(|r| r.transaction_hash).collect();
        assert_eq!(order, vec![hash(1), hash(2), hash(3), hash(4)]);
    }

    #[tokio::test]
    async fn non_retryable_fetch_errors_propagate() {
        struct BrokenLedger;

        #[async_trait]
        impl ReceiptFetcher for BrokenLedger {
            async fn receipt(&self, _hash: TxHash) -> Result<Option<Receipt>, SdkError> {
                Err(SdkError::Parse("mangled receipt".into()))
            }
        }

        let result = wait_till_completed(&BrokenLedger, hash(1), WaitOptions::default()).await;
        assert!(matches!(result, Err(SdkError::Parse(_))));
    }
}
