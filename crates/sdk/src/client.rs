use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use shardnet_types::{Address, Receipt, ShardId, TxHash};

use crate::error::SdkError;
use crate::tracker::{self, ReceiptFetcher, WaitOptions};

/// Block position used when querying per-account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    #[default]
    Latest,
    Earliest,
    Pending,
}

impl BlockTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockTag::Latest => "latest",
            BlockTag::Earliest => "earliest",
            BlockTag::Pending => "pending",
        }
    }
}

/// JSON-RPC client for the ledger's public query and submission surface.
#[derive(Clone)]
pub struct PublicClient {
    endpoint: Url,
    http: Client,
    next_id: Arc<AtomicU64>,
}

impl PublicClient {
    /// Create a new client for the provided RPC endpoint.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, SdkError> {
        Self::with_http_client(
            endpoint,
            Client::builder().timeout(Duration::from_secs(10)).build()?,
        )
    }

    /// Use an existing reqwest client (useful for custom TLS or middleware).
    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self, SdkError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|_| SdkError::InvalidBaseUrl(endpoint.as_ref().to_string()))?;
        Ok(Self {
            endpoint,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Expose the underlying endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The chain id the node reports.
    pub async fn chain_id(&self) -> Result<u64, SdkError> {
        let raw: String = self.request("eth_chainId", json!([])).await?;
        parse_u64_quantity(&raw)
    }

    /// The number of transactions sent from `address`, i.e. the next seqno.
    pub async fn get_transaction_count(
        &self,
        address: Address,
        block_tag: BlockTag,
    ) -> Result<u64, SdkError> {
        let raw: String = self
            .request(
                "eth_getTransactionCount",
                json!([address.to_hex(), block_tag.as_str()]),
            )
            .await?;
        parse_u64_quantity(&raw)
    }

    /// The current gas price on the given shard, used to size fee credits.
    pub async fn gas_price(&self, shard_id: ShardId) -> Result<U256, SdkError> {
        let raw: String = self.request("eth_gasPrice", json!([shard_id])).await?;
        parse_u256_quantity(&raw)
    }

    /// Submit an encoded signed transaction, returning its identifier.
    pub async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, SdkError> {
        let raw: String = self
            .request(
                "eth_sendRawTransaction",
                json!([format!("0x{}", hex::encode(encoded))]),
            )
            .await?;
        TxHash::from_hex(&raw).map_err(|err| SdkError::parse_error(err.to_string()))
    }

    /// Fetch the receipt of a transaction, or `None` if the ledger has not
    /// indexed it yet.
    pub async fn get_receipt(&self, hash: TxHash) -> Result<Option<Receipt>, SdkError> {
        let value = self
            .request_value("eth_getInTransactionReceipt", json!([hash.to_hex()]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| SdkError::parse_error(format!("invalid receipt: {err}")))
    }

    /// Poll until the full receipt tree of `hash` has resolved; see
    /// [`tracker::wait_till_completed`].
    pub async fn wait_till_completed(
        &self,
        hash: TxHash,
        options: WaitOptions,
    ) -> Result<Vec<Receipt>, SdkError> {
        tracker::wait_till_completed(self, hash, options).await
    }

    async fn request<T>(&self, method: &str, params: Value) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let value = self.request_value(method, params).await?;
        serde_json::from_value(value)
            .map_err(|err| SdkError::parse_error(format!("invalid {method} result: {err}")))
    }

    async fn request_value(&self, method: &str, params: Value) -> Result<Value, SdkError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "rpc request");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;
        if let Some(error) = response.error {
            return Err(SdkError::rpc_error(error.code, error.message));
        }
        Ok(response.result)
    }
}

#[async_trait::async_trait]
impl ReceiptFetcher for PublicClient {
    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, SdkError> {
        self.get_receipt(hash).await
    }
}

#[async_trait::async_trait]
impl crate::envelope::RawTransactionSender for PublicClient {
    async fn send_raw_transaction(&self, encoded: &[u8]) -> Result<TxHash, SdkError> {
        PublicClient::send_raw_transaction(self, encoded).await
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

fn strip_quantity_prefix(raw: &str) -> Result<&str, SdkError> {
    raw.strip_prefix("0x")
        .ok_or_else(|| SdkError::parse_error(format!("quantity `{raw}` lacks 0x prefix")))
}

fn parse_u64_quantity(raw: &str) -> Result<u64, SdkError> {
    let digits = strip_quantity_prefix(raw)?;
    u64::from_str_radix(digits, 16)
        .map_err(|err| SdkError::parse_error(format!("invalid quantity `{raw}`: {err}")))
}

fn parse_u256_quantity(raw: &str) -> Result<U256, SdkError> {
    let digits = strip_quantity_prefix(raw)?;
    U256::from_str_radix(digits, 16)
        .map_err(|err| SdkError::parse_error(format!("invalid quantity `{raw}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_parse_from_hex() {
        assert_eq!(parse_u64_quantity("0x100").unwrap(), 256);
        assert_eq!(parse_u64_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_u256_quantity("0x100").unwrap(), U256::from(256u64));
        assert!(matches!(
            parse_u64_quantity("256"),
            Err(SdkError::Parse(_))
        ));
        assert!(matches!(
            parse_u64_quantity("0xzz"),
            Err(SdkError::Parse(_))
        ));
    }

    #[test]
    fn request_body_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 7,
            method: "eth_gasPrice",
            params: json!([1]),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({ "jsonrpc": "2.0", "id": 7, "method": "eth_gasPrice", "params": [1] })
        );
    }

    #[test]
    fn error_responses_surface_code_and_message() {
        let response: RpcResponse = serde_json::from_str(
            r#"{ "jsonrpc": "2.0", "id": 1, "error": { "code": -32000, "message": "nope" } }"#,
        )
        .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "nope");
        assert!(response.result.is_null());
    }

    #[test]
    fn null_result_maps_to_absent_receipt() {
        let response: RpcResponse =
            serde_json::from_str(r#"{ "jsonrpc": "2.0", "id": 1, "result": null }"#).unwrap();
        assert!(response.result.is_null());
        assert!(response.error.is_none());
    }

    #[test]
    fn invalid_endpoint_rejected() {
        assert!(matches!(
            PublicClient::new("not a url"),
            Err(SdkError::InvalidBaseUrl(_))
        ));
    }
}
