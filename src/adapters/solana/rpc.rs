//! Solana JSON-RPC Client
//!
//! Account lookups for bonding-curve addresses over plain JSON-RPC.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::adapters::http::{RequestError, ResilientClient, RetryPolicy};
use crate::ports::{AccountFetch, ChainPort};

/// Solana RPC client configuration
#[derive(Debug, Clone)]
pub struct SolanaRpcConfig {
    pub rpc_url: String,
    /// Request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for SolanaRpcConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolanaRpcClient {
    rpc_url: String,
    client: ResilientClient,
}

impl SolanaRpcClient {
    pub fn new(config: SolanaRpcConfig) -> Result<Self, RequestError> {
        let client = ResilientClient::new(config.timeout, config.retry)?;
        Ok(Self {
            rpc_url: config.rpc_url,
            client,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// `getAccountInfo` with base64 encoding at confirmed commitment
    pub async fn get_account_info(&self, address: &str) -> AccountFetch {
        let params = json!([address, {"encoding": "base64", "commitment": "confirmed"}]);
        match self.client.rpc_call(&self.rpc_url, "getAccountInfo", params).await {
            Some(result) => parse_account_info(&result),
            None => AccountFetch::Unavailable,
        }
    }
}

#[async_trait]
impl ChainPort for SolanaRpcClient {
    async fn fetch_account(&self, address: &str) -> AccountFetch {
        self.get_account_info(address).await
    }
}

/// Map a `getAccountInfo` result onto the account states.
pub fn parse_account_info(result: &Value) -> AccountFetch {
    let value = &result["value"];
    if value.is_null() {
        return AccountFetch::Closed;
    }

    let data = match &value["data"] {
        Value::Array(parts) => parts.first().and_then(Value::as_str),
        Value::String(s) => Some(s.as_str()),
        _ => None,
    };

    match data {
        Some(encoded) => AccountFetch::Found(encoded.to_string()),
        None => {
            tracing::debug!("getAccountInfo returned an account without base64 data");
            AccountFetch::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_found() {
        let result = json!({
            "context": {"slot": 300_000_000u64},
            "value": {
                "data": ["F7f4N2DYrGA=", "base64"],
                "executable": false,
                "lamports": 1_461_600u64,
                "owner": "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P"
            }
        });
        assert_eq!(parse_account_info(&result), AccountFetch::Found("F7f4N2DYrGA=".into()));
    }

    #[test]
    fn test_parse_closed() {
        let result = json!({"context": {"slot": 1}, "value": null});
        assert_eq!(parse_account_info(&result), AccountFetch::Closed);
    }

    #[test]
    fn test_parse_missing_data() {
        let result = json!({"value": {"lamports": 1}});
        assert_eq!(parse_account_info(&result), AccountFetch::Unavailable);
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = SolanaRpcClient::new(SolanaRpcConfig::default()).unwrap();
        assert!(client.rpc_url().starts_with("https://"));
    }
}
