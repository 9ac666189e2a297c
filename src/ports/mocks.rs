//! In-memory port implementations
//!
//! Record calls, return configured responses, and optionally add random
//! latency. Each fake tracks the peak number of concurrent calls so gate
//! ceilings can be asserted.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{AccountFetch, CandlePort, ChainPort, MarketDataPort};
use crate::domain::market::{Candle, CandleQuery, DexPair};

/// Concurrency tracker and latency source shared by the fakes
#[derive(Debug, Default)]
struct CallTracker {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    latency_ms: Option<(u64, u64)>,
}

impl CallTracker {
    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some((min, max)) = self.latency_ms {
            let ms = rand::thread_rng().gen_range(min..=max);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

fn record(calls: &Mutex<Vec<String>>, key: &str) {
    calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(key.to_string());
}

/// Mock chain port keyed by account address
#[derive(Debug)]
pub struct MockChain {
    calls: Arc<Mutex<Vec<String>>>,
    responses: HashMap<String, AccountFetch>,
    default_response: AccountFetch,
    tracker: CallTracker,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            responses: HashMap::new(),
            default_response: AccountFetch::Closed,
            tracker: CallTracker::default(),
        }
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the response for an account address
    pub fn with_response(mut self, address: &str, response: AccountFetch) -> Self {
        self.responses.insert(address.to_string(), response);
        self
    }

    /// Response for addresses without an explicit entry (default: closed)
    pub fn with_default(mut self, response: AccountFetch) -> Self {
        self.default_response = response;
        self
    }

    /// Sleep a random duration in `[min_ms, max_ms]` per call
    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.tracker.latency_ms = Some((min_ms, max_ms));
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Highest number of concurrent calls seen
    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak()
    }
}

#[async_trait]
impl ChainPort for MockChain {
    async fn fetch_account(&self, address: &str) -> AccountFetch {
        record(&self.calls, address);
        self.tracker.enter().await;
        let response = self
            .responses
            .get(address)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone());
        self.tracker.exit();
        response
    }
}

/// Mock pair-listing port keyed by mint
#[derive(Debug)]
pub struct MockMarketData {
    calls: Arc<Mutex<Vec<String>>>,
    responses: HashMap<String, Option<Vec<DexPair>>>,
    default_response: Option<Vec<DexPair>>,
    panic_on: HashSet<String>,
    tracker: CallTracker,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self {
            calls: Arc::default(),
            responses: HashMap::new(),
            default_response: Some(Vec::new()),
            panic_on: HashSet::new(),
            tracker: CallTracker::default(),
        }
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the pairs returned for a mint
    pub fn with_pairs(mut self, mint: &str, pairs: Vec<DexPair>) -> Self {
        self.responses.insert(mint.to_string(), Some(pairs));
        self
    }

    /// Simulate an unreachable provider for a mint
    pub fn with_unavailable(mut self, mint: &str) -> Self {
        self.responses.insert(mint.to_string(), None);
        self
    }

    /// Panic when this mint is requested
    pub fn with_panic_on(mut self, mint: &str) -> Self {
        self.panic_on.insert(mint.to_string());
        self
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.tracker.latency_ms = Some((min_ms, max_ms));
        self
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak()
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn token_pairs(&self, mint: &str) -> Option<Vec<DexPair>> {
        record(&self.calls, mint);
        if self.panic_on.contains(mint) {
            panic!("simulated provider crash for {}", mint);
        }
        self.tracker.enter().await;
        let response = self
            .responses
            .get(mint)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone());
        self.tracker.exit();
        response
    }
}

/// Mock candle port keyed by pool address
#[derive(Debug, Default)]
pub struct MockCandles {
    calls: Arc<Mutex<Vec<(String, CandleQuery)>>>,
    responses: HashMap<String, Vec<Candle>>,
    tracker: CallTracker,
}

impl MockCandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set candles for a pool; unknown pools return `None`
    pub fn with_candles(mut self, pool: &str, candles: Vec<Candle>) -> Self {
        self.responses.insert(pool.to_string(), candles);
        self
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.tracker.latency_ms = Some((min_ms, max_ms));
        self
    }

    pub fn get_calls(&self) -> Vec<(String, CandleQuery)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.tracker.peak()
    }
}

#[async_trait]
impl CandlePort for MockCandles {
    async fn ohlcv(&self, pool_address: &str, query: CandleQuery) -> Option<Vec<Candle>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((pool_address.to_string(), query));
        self.tracker.enter().await;
        let response = self.responses.get(pool_address).cloned();
        self.tracker.exit();
        response
    }
}
