//! Graduation Scanner Library
//!
//! Detects whether pump.fun tokens have graduated from their bonding curve and
//! enriches them with market data, for batches of thousands of launches.
//!
//! # Modules
//!
//! - `domain`: Address derivation, account decoding, signal fusion, records
//! - `ports`: Trait abstractions (ChainPort, MarketDataPort, CandlePort)
//! - `adapters`: External implementations (Solana RPC, DexScreener, GeckoTerminal, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Per-token enricher and concurrent batch orchestrator

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
