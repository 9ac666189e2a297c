//! DexScreener Types
//!
//! Response shapes for `/latest/dex/tokens/{mint}`. Numeric fields arrive
//! as numbers or strings depending on the field and pair age.

use serde::Deserialize;

use crate::domain::market::DexPair;

/// Number that may be encoded as a JSON string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    /// Unparsable text becomes 0.0
    pub fn value(&self) -> f64 {
        match self {
            LenientNumber::Number(n) => *n,
            LenientNumber::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        }
    }
}

fn lenient(n: &Option<LenientNumber>) -> f64 {
    n.as_ref().map(LenientNumber::value).unwrap_or(0.0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenPairsResponse {
    /// `null` when the token has no pools
    #[serde(default)]
    pub pairs: Option<Vec<PairInfo>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<LenientNumber>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairInfo {
    #[serde(rename = "dexId", default)]
    pub dex_id: String,
    #[serde(rename = "pairAddress", default)]
    pub pair_address: String,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<LenientNumber>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<LenientNumber>,
    #[serde(default)]
    pub fdv: Option<LenientNumber>,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    /// Milliseconds since epoch
    #[serde(rename = "pairCreatedAt", default)]
    pub pair_created_at: Option<i64>,
}

impl From<PairInfo> for DexPair {
    fn from(p: PairInfo) -> Self {
        DexPair {
            market_cap_usd: lenient(&p.market_cap),
            fdv: lenient(&p.fdv),
            liquidity_usd: p.liquidity.as_ref().map(|l| lenient(&l.usd)).unwrap_or(0.0),
            price_usd: lenient(&p.price_usd),
            pair_created_at: p.pair_created_at,
            dex_id: p.dex_id,
            pair_address: p.pair_address,
        }
    }
}
