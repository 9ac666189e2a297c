//! Market Data Types
//!
//! Exchange pairs reported by the pair-listing provider, the snapshot selected
//! from them, and OHLCV candles from the candle provider.

use serde::{Deserialize, Serialize};

/// One pool entry for a token
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DexPair {
    /// Exchange identifier (e.g. "raydium", "pumpfun")
    pub dex_id: String,
    /// Pool address
    pub pair_address: String,
    pub market_cap_usd: f64,
    pub fdv: f64,
    pub liquidity_usd: f64,
    pub price_usd: f64,
    /// Pool creation time in milliseconds
    pub pair_created_at: Option<i64>,
}

/// Best pair for a token, plus whether a graduated-exchange pool exists
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// True when a pool on one of the graduation exchanges exists
    pub graduated: bool,
    /// Only set for graduation-exchange pools
    pub pair_address: Option<String>,
    pub dex_id: String,
    pub market_cap_usd: f64,
    pub fdv: f64,
    pub liquidity_usd: f64,
    pub price_usd: f64,
    pub pair_created_at: Option<i64>,
}

/// Pick the first graduation-exchange pair, else the first pair.
pub fn select_snapshot(pairs: &[DexPair], graduation_dex_ids: &[String]) -> Option<MarketSnapshot> {
    let is_graduation_dex = |pair: &&DexPair| {
        graduation_dex_ids
            .iter()
            .any(|id| id.eq_ignore_ascii_case(&pair.dex_id))
    };

    let graduated_pair = pairs.iter().find(is_graduation_dex);
    let best = graduated_pair.or_else(|| pairs.first())?;

    Some(MarketSnapshot {
        graduated: graduated_pair.is_some(),
        pair_address: graduated_pair
            .map(|p| p.pair_address.clone())
            .filter(|addr| !addr.is_empty()),
        dex_id: best.dex_id.clone(),
        market_cap_usd: best.market_cap_usd,
        fdv: best.fdv,
        liquidity_usd: best.liquidity_usd,
        price_usd: best.price_usd,
        pair_created_at: best.pair_created_at,
    })
}

/// `(timestamp, open, high, low, close, volume)`, serialized as a 6-element array
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl From<[f64; 6]> for Candle {
    fn from(v: [f64; 6]) -> Self {
        Self {
            timestamp: v[0] as i64,
            open: v[1],
            high: v[2],
            low: v[3],
            close: v[4],
            volume: v[5],
        }
    }
}

impl From<Candle> for [f64; 6] {
    fn from(c: Candle) -> Self {
        [c.timestamp as f64, c.open, c.high, c.low, c.close, c.volume]
    }
}

/// Parameters of one candle request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    /// "minute", "hour" or "day"
    pub timeframe: String,
    pub before_timestamp: i64,
    pub limit: u32,
}

/// Candle window anchored at token creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleWindow {
    pub timeframe: String,
    pub window_secs: i64,
    pub fetch_limit: u32,
    pub keep: usize,
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self {
            timeframe: "hour".to_string(),
            window_secs: 86_400,
            fetch_limit: 48,
            keep: 24,
        }
    }
}

impl CandleWindow {
    /// Request covering the window after `block_time`. `None` when the window
    /// end does not fit in an `i64`.
    pub fn query(&self, block_time: i64) -> Option<CandleQuery> {
        Some(CandleQuery {
            timeframe: self.timeframe.clone(),
            before_timestamp: block_time.checked_add(self.window_secs)?,
            limit: self.fetch_limit,
        })
    }

    /// Drop candles before creation and keep at most `keep`, oldest first.
    pub fn trim(&self, mut candles: Vec<Candle>, block_time: i64) -> Vec<Candle> {
        candles.retain(|c| c.timestamp >= block_time);
        candles.sort_by_key(|c| c.timestamp);
        candles.truncate(self.keep);
        candles
    }
}
