//! GeckoTerminal API Client
//!
//! Hourly OHLCV candles for a pool.

use async_trait::async_trait;
use std::time::Duration;

use super::types::OhlcvResponse;
use crate::adapters::http::{RequestError, ResilientClient, RetryPolicy};
use crate::domain::market::{Candle, CandleQuery};
use crate::ports::CandlePort;

/// GeckoTerminal client configuration
#[derive(Debug, Clone)]
pub struct GeckoTerminalConfig {
    /// Base URL for the GeckoTerminal API
    pub api_base_url: String,
    /// Network slug used in the URL path
    pub network: String,
    /// Request timeout
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for GeckoTerminalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.geckoterminal.com/api/v2".to_string(),
            network: "solana".to_string(),
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeckoTerminalClient {
    config: GeckoTerminalConfig,
    client: ResilientClient,
}

impl GeckoTerminalClient {
    pub fn new() -> Result<Self, RequestError> {
        Self::with_config(GeckoTerminalConfig::default())
    }

    pub fn with_config(config: GeckoTerminalConfig) -> Result<Self, RequestError> {
        let client = ResilientClient::new(config.timeout, config.retry.clone())?;
        Ok(Self { config, client })
    }

    pub fn ohlcv_url(&self, pool: &str, timeframe: &str) -> String {
        format!(
            "{}/networks/{}/pools/{}/ohlcv/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.network,
            pool,
            timeframe
        )
    }

    pub async fn get_ohlcv(&self, pool: &str, query: &CandleQuery) -> Option<Vec<Candle>> {
        let url = self.ohlcv_url(pool, &query.timeframe);
        let params = [
            ("aggregate", "1".to_string()),
            ("before_timestamp", query.before_timestamp.to_string()),
            ("limit", query.limit.to_string()),
            ("currency", "usd".to_string()),
        ];

        let body = self.client.get_json(&url, &params).await?;
        match serde_json::from_value::<OhlcvResponse>(body) {
            Ok(response) => Some(response.into_candles()),
            Err(e) => {
                tracing::warn!("Unexpected GeckoTerminal response for pool {}: {}", pool, e);
                None
            }
        }
    }
}

#[async_trait]
impl CandlePort for GeckoTerminalClient {
    async fn ohlcv(&self, pool_address: &str, query: CandleQuery) -> Option<Vec<Candle>> {
        self.get_ohlcv(pool_address, &query).await
    }
}
