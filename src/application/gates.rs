//! Per-Source Gates
//!
//! Counting semaphores that cap in-flight requests to each external source.
//! A permit is held for exactly one port call.

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

pub const DEFAULT_CHAIN_PERMITS: usize = 50;
pub const DEFAULT_MARKET_PERMITS: usize = 5;
pub const DEFAULT_CANDLE_PERMITS: usize = 3;

/// Independent gates for the chain RPC, pair listings and candles
#[derive(Debug, Clone)]
pub struct SourceGates {
    chain: Arc<Semaphore>,
    market: Arc<Semaphore>,
    candles: Arc<Semaphore>,
}

impl Default for SourceGates {
    fn default() -> Self {
        Self::new(DEFAULT_CHAIN_PERMITS, DEFAULT_MARKET_PERMITS, DEFAULT_CANDLE_PERMITS)
    }
}

impl SourceGates {
    /// Capacities below 1 are raised to 1.
    pub fn new(chain: usize, market: usize, candles: usize) -> Self {
        Self {
            chain: Arc::new(Semaphore::new(chain.max(1))),
            market: Arc::new(Semaphore::new(market.max(1))),
            candles: Arc::new(Semaphore::new(candles.max(1))),
        }
    }

    /// Build from externally owned semaphores, e.g. shared with another pipeline.
    pub fn from_semaphores(chain: Arc<Semaphore>, market: Arc<Semaphore>, candles: Arc<Semaphore>) -> Self {
        Self { chain, market, candles }
    }

    /// Capacity 1 everywhere
    pub fn serial() -> Self {
        Self::new(1, 1, 1)
    }

    /// `None` only if the gate was closed.
    pub async fn chain(&self) -> Option<SemaphorePermit<'_>> {
        self.chain.acquire().await.ok()
    }

    pub async fn market(&self) -> Option<SemaphorePermit<'_>> {
        self.market.acquire().await.ok()
    }

    pub async fn candles(&self) -> Option<SemaphorePermit<'_>> {
        self.candles.acquire().await.ok()
    }

    /// Close every gate; pending and future acquisitions fail.
    pub fn close(&self) {
        self.chain.close();
        self.market.close();
        self.candles.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let gates = SourceGates::serial();
        {
            let _permit = gates.chain().await.unwrap();
            assert!(gates.chain.try_acquire().is_err());
        }
        assert!(gates.chain().await.is_some());
    }

    #[tokio::test]
    async fn test_gates_are_independent() {
        let gates = SourceGates::serial();
        let _chain = gates.chain().await.unwrap();
        assert!(gates.market().await.is_some());
        assert!(gates.candles().await.is_some());
    }

    #[tokio::test]
    async fn test_closed_gate() {
        let gates = SourceGates::default();
        gates.close();
        assert!(gates.market().await.is_none());
    }

    #[test]
    fn test_zero_capacity_raised() {
        let gates = SourceGates::new(0, 0, 0);
        assert_eq!(gates.candles.available_permits(), 1);
    }
}
