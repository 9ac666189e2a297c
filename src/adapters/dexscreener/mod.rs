//! DexScreener Adapter
//!
//! Pair-listing provider: pools, market cap and liquidity per token.

mod client;
mod types;

pub use client::{DexScreenerClient, DexScreenerConfig};
pub use types::{LenientNumber, PairInfo, TokenPairsResponse};
