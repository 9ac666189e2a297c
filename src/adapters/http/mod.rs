//! HTTP Adapter
//!
//! Shared retrying client used by the chain RPC and market-data adapters.

mod client;
mod error;
mod retry;

pub use client::{JsonRpcError, JsonRpcResponse, ResilientClient};
pub use error::RequestError;
pub use retry::RetryPolicy;
