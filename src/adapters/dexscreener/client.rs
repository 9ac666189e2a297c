//! DexScreener API Client
//!
//! Pair listings for a token mint.

use async_trait::async_trait;
use std::time::Duration;

use super::types::TokenPairsResponse;
use crate::adapters::http::{RequestError, ResilientClient, RetryPolicy};
use crate::domain::market::DexPair;
use crate::ports::MarketDataPort;

/// DexScreener client configuration
#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    /// Base URL for the DexScreener API
    pub api_base_url: String,
    /// Request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.dexscreener.com".to_string(),
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    config: DexScreenerConfig,
    client: ResilientClient,
}

impl DexScreenerClient {
    pub fn new() -> Result<Self, RequestError> {
        Self::with_config(DexScreenerConfig::default())
    }

    pub fn with_config(config: DexScreenerConfig) -> Result<Self, RequestError> {
        let client = ResilientClient::new(config.timeout, config.retry.clone())?;
        Ok(Self { config, client })
    }

    pub fn pairs_url(&self, mint: &str) -> String {
        format!(
            "{}/latest/dex/tokens/{}",
            self.config.api_base_url.trim_end_matches('/'),
            mint
        )
    }

    /// All pools for `mint`. `None` when the API is unreachable or the body
    /// does not parse.
    pub async fn get_token_pairs(&self, mint: &str) -> Option<Vec<DexPair>> {
        let body = self.client.get_json(&self.pairs_url(mint), &[]).await?;

        match serde_json::from_value::<TokenPairsResponse>(body) {
            Ok(response) => Some(
                response
                    .pairs
                    .unwrap_or_default()
                    .into_iter()
                    .map(DexPair::from)
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!("Unexpected DexScreener response for {}: {}", mint, e);
                None
            }
        }
    }
}

#[async_trait]
impl MarketDataPort for DexScreenerClient {
    async fn token_pairs(&self, mint: &str) -> Option<Vec<DexPair>> {
        self.get_token_pairs(mint).await
    }
}
