//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The chain RPC (bonding-curve account lookups)
//! - The pair-listing provider (pools, market cap, liquidity)
//! - The candle provider (hourly OHLCV)

pub mod chain;
pub mod market_data;
pub mod mocks;

pub use chain::{AccountFetch, ChainPort};
pub use market_data::{CandlePort, MarketDataPort};
