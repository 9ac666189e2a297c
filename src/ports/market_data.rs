use async_trait::async_trait;

use crate::domain::market::{Candle, CandleQuery, DexPair};

/// Pair-listing provider port
///
/// `None` means the provider could not be reached; an empty list means it
/// answered with no pools.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    async fn token_pairs(&self, mint: &str) -> Option<Vec<DexPair>>;
}

/// OHLCV provider port
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandlePort: Send + Sync {
    async fn ohlcv(&self, pool_address: &str, query: CandleQuery) -> Option<Vec<Candle>>;
}
