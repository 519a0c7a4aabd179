use serde::{Deserialize, Serialize};

use crate::address::{Address, ShardId, MAIN_SHARD_ID};
use crate::hash::TxHash;

/// Ledger-side outcome of one transaction, as returned by the receipt
/// query. Cross-shard calls spawn child transactions whose hashes appear in
/// `out_transactions`; `output_receipts` is the parallel list of their
/// receipts, filled in as the ledger indexes them.
///
/// `None` consistently means "not yet known": an unknown child set, or a
/// child receipt that has not been fetched. A `success == false` receipt is
/// a valid terminal state, not an incomplete one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    pub shard_id: ShardId,
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub gas_used: u64,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub out_transactions: Option<Vec<TxHash>>,
    #[serde(default)]
    pub output_receipts: Option<Vec<Option<Receipt>>>,
    /// Whether the block holding this transaction has been referenced by
    /// the main shard (the finality signal).
    #[serde(default)]
    pub included_in_main: bool,
}

impl Receipt {
    /// Whether this node's own child set is fully resolved: the spawned
    /// transactions are known and every one of their receipts has been
    /// fetched. Says nothing about the children's own subtrees.
    pub fn children_resolved(&self) -> bool {
        match (&self.out_transactions, &self.output_receipts) {
            (None, _) => false,
            (Some(children), None) => children.is_empty(),
            (Some(_), Some(outputs)) => outputs.iter().all(Option::is_some),
        }
    }

    /// Whether this node has reached finality for the purpose of completion
    /// tracking: main-shard transactions are final by definition, everything
    /// else must have been referenced by the main shard.
    pub fn finalized(&self) -> bool {
        self.shard_id == MAIN_SHARD_ID || self.included_in_main
    }

    /// The recursive completeness invariant: the child set is known, every
    /// child receipt is present and itself complete, and (if requested)
    /// every node off the main shard has been referenced by it.
    pub fn is_complete(&self, wait_till_main_shard: bool) -> bool {
        if !self.children_resolved() {
            return false;
        }
        if wait_till_main_shard && !self.finalized() {
            return false;
        }
        match &self.output_receipts {
            Some(outputs) => outputs
                .iter()
                .all(|r| r.as_ref().is_some_and(|r| r.is_complete(wait_till_main_shard))),
            None => true,
        }
    }
}
