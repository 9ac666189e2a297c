//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - HTTP: Retrying client shared by every source
//! - Solana: JSON-RPC account lookups
//! - DexScreener: Pair listings
//! - GeckoTerminal: OHLCV candles
//! - CLI: Command-line interface handlers

pub mod http;
pub mod solana;
pub mod dexscreener;
pub mod geckoterminal;
pub mod cli;

pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use geckoterminal::GeckoTerminalClient;
pub use http::ResilientClient;
pub use solana::SolanaRpcClient;
