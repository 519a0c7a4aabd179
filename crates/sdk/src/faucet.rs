use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::time::{sleep, timeout};
use tracing::warn;
use url::Url;

use shardnet_types::{Address, TxHash};

use crate::error::SdkError;
use crate::tracker::{wait_till_completed, ReceiptFetcher, WaitOptions};

/// How long a single top-up attempt waits for its receipt tree before the
/// request is retried.
const TOP_UP_DEADLINE: Duration = Duration::from_secs(10);

/// Client for the funding service that mints tokens to accounts.
///
/// The service runs its own RPC surface, separate from the ledger node; the
/// contract assumed here is that a top-up is idempotent enough to retry.
#[derive(Clone)]
pub struct FaucetClient {
    endpoint: Url,
    http: Client,
    next_id: Arc<AtomicU64>,
}

impl FaucetClient {
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, SdkError> {
        Self::with_http_client(
            endpoint,
            Client::builder().timeout(Duration::from_secs(10)).build()?,
        )
    }

    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self, SdkError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|_| SdkError::InvalidBaseUrl(endpoint.as_ref().to_string()))?;
        Ok(Self {
            endpoint,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// All available faucets, keyed by token name.
    pub async fn get_faucets(&self) -> Result<HashMap<String, Address>, SdkError> {
        self.request("faucet_getFaucets", json!([])).await
    }

    /// Ask the faucet to mint `amount` of its token to `account`, returning
    /// the identifier of the top-up transaction.
    pub async fn top_up(
        &self,
        faucet: Address,
        account: Address,
        amount: U256,
    ) -> Result<TxHash, SdkError> {
        let raw: String = self
            .request(
                "faucet_topUpViaFaucet",
                json!([faucet.to_hex(), account.to_hex(), format!("0x{amount:x}")]),
            )
            .await?;
        TxHash::from_hex(&raw).map_err(|err| SdkError::parse_error(err.to_string()))
    }

    /// Top up and wait for the resulting receipt tree to complete,
    /// retrying the whole request when tracking stalls past a fixed
    /// deadline or any receipt in the tree failed.
    pub async fn top_up_and_wait<F>(
        &self,
        fetcher: &F,
        faucet: Address,
        account: Address,
        amount: U256,
        retries: u32,
    ) -> Result<TxHash, SdkError>
    where
        F: ReceiptFetcher + ?Sized,
    {
        let mut attempt = 0;
        while attempt < retries {
            attempt += 1;
            let tx_hash = match self.top_up(faucet, account, amount).await {
                Ok(tx_hash) => tx_hash,
                Err(err) if attempt == retries => return Err(err),
                Err(err) => {
                    warn!(%account, error = %err, "top-up request failed, retrying");
                    sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };

            let tracked = timeout(
                TOP_UP_DEADLINE,
                wait_till_completed(fetcher, tx_hash, WaitOptions::default()),
            )
            .await;
            match tracked {
                Ok(Ok(receipts)) if receipts.iter().all(|receipt| receipt.success) => {
                    return Ok(tx_hash);
                }
                Ok(Ok(_)) => warn!(%tx_hash, "top-up execution failed, retrying"),
                Ok(Err(err)) if attempt == retries => return Err(err),
                Ok(Err(err)) => warn!(%tx_hash, error = %err, "top-up tracking failed, retrying"),
                Err(_) => warn!(%tx_hash, "top-up tracking timed out, retrying"),
            }
        }
        Err(SdkError::TopUpFailed { retries })
    }

    async fn request<T>(&self, method: &str, params: Value) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let request = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed");
            return Err(SdkError::rpc_error(code, message));
        }
        let result = response.get("result").cloned().unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|err| SdkError::parse_error(format!("invalid {method} result: {err}")))
    }
}
