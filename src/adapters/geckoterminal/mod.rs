//! GeckoTerminal Adapter
//!
//! Candle provider for graduated pools.

mod client;
mod types;

pub use client::{GeckoTerminalClient, GeckoTerminalConfig};
pub use types::OhlcvResponse;
