//! Enrichment Orchestrator
//!
//! Fans a batch of launches out over a bounded pool of tokio tasks and
//! collects one outcome per launch, in input order. A unit that panics is
//! reported as a failed outcome; the batch always completes.

use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;

use super::enricher::TokenEnricher;
use crate::domain::fusion::TokenStatus;
use crate::domain::persistence::LaunchRow;
use crate::domain::record::{EnrichedTokenRecord, EnrichmentOutcome, TokenLaunch};
use crate::domain::summary::graduation_rate;

pub const DEFAULT_MAX_WORKERS: usize = 50;
pub const DEFAULT_PROGRESS_EVERY: usize = 500;

/// Shared batch state; the lock is never held across an await
#[derive(Debug)]
struct BatchProgress {
    total: usize,
    completed: usize,
    graduated: usize,
    slots: Vec<Option<EnrichmentOutcome>>,
}

/// Counters captured under the lock for logging after release
#[derive(Debug, Clone, Copy)]
struct ProgressSnapshot {
    completed: usize,
    graduated: usize,
    total: usize,
}

impl BatchProgress {
    fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            graduated: 0,
            slots: vec![None; total],
        }
    }

    fn complete(&mut self, index: usize, outcome: EnrichmentOutcome) -> ProgressSnapshot {
        self.completed += 1;
        if outcome.record().status == TokenStatus::Graduated {
            self.graduated += 1;
        }
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(outcome);
        }
        ProgressSnapshot {
            completed: self.completed,
            graduated: self.graduated,
            total: self.total,
        }
    }
}

pub struct EnrichmentOrchestrator {
    enricher: Arc<TokenEnricher>,
    max_workers: usize,
    progress_every: usize,
    verbose: bool,
}

impl EnrichmentOrchestrator {
    pub fn new(enricher: TokenEnricher) -> Self {
        Self {
            enricher: Arc::new(enricher),
            max_workers: DEFAULT_MAX_WORKERS,
            progress_every: DEFAULT_PROGRESS_EVERY,
            verbose: false,
        }
    }

    /// Maximum concurrently running units
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Log a progress line every `n` completions
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n.max(1);
        self
    }

    /// Log one line per token
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enrich the readable rows and report unreadable ones as failed in place.
    pub async fn enrich_rows(&self, rows: Vec<LaunchRow>) -> Vec<EnrichmentOutcome> {
        let mut invalid = Vec::new();
        let mut tokens = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                LaunchRow::Valid(launch) => tokens.push(launch),
                LaunchRow::Invalid { mint, error } => {
                    invalid.push((index, EnrichmentOutcome::failed(TokenLaunch::new(mint), error)))
                }
            }
        }

        let mut outcomes = self.enrich_all(tokens).await;
        for (index, outcome) in invalid {
            outcomes.insert(index, outcome);
        }
        outcomes
    }

    /// Enrich every launch. The result has the same length and order as `tokens`.
    pub async fn enrich_all(&self, tokens: Vec<TokenLaunch>) -> Vec<EnrichmentOutcome> {
        let total = tokens.len();
        let started = Instant::now();
        let workers = Arc::new(Semaphore::new(self.max_workers));
        let progress = Arc::new(Mutex::new(BatchProgress::new(total)));

        tracing::info!(
            "Enriching {} tokens with {} workers",
            total,
            self.max_workers
        );

        let mut handles = Vec::with_capacity(total);
        for (index, launch) in tokens.iter().cloned().enumerate() {
            let permit = workers.clone().acquire_owned().await.ok();
            let enricher = Arc::clone(&self.enricher);
            let progress = Arc::clone(&progress);
            let progress_every = self.progress_every;
            let verbose = self.verbose;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let record = enricher.enrich(launch).await;
                if verbose {
                    log_record(&record);
                }

                let snapshot = progress
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .complete(index, EnrichmentOutcome::Enriched(record));

                if snapshot.completed % progress_every == 0 {
                    log_progress(snapshot, started);
                }
            });
            handles.push((index, handle));
        }

        for (index, handle) in handles {
            if let Err(e) = handle.await {
                let error = if e.is_panic() {
                    format!("worker panicked: {}", panic_message(e.into_panic()))
                } else {
                    format!("worker cancelled: {}", e)
                };
                tracing::warn!("Enrichment of {} failed: {}", tokens[index].mint, error);

                let outcome = EnrichmentOutcome::failed(tokens[index].clone(), error);
                progress
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .complete(index, outcome);
            }
        }

        let (slots, snapshot) = {
            let mut guard = progress.lock().unwrap_or_else(PoisonError::into_inner);
            let snapshot = ProgressSnapshot {
                completed: guard.completed,
                graduated: guard.graduated,
                total: guard.total,
            };
            (std::mem::take(&mut guard.slots), snapshot)
        };
        log_progress(snapshot, started);

        slots
            .into_iter()
            .zip(tokens)
            .map(|(slot, launch)| {
                slot.unwrap_or_else(|| EnrichmentOutcome::failed(launch, "worker produced no result"))
            })
            .collect()
    }
}

fn log_progress(snapshot: ProgressSnapshot, started: Instant) {
    tracing::info!(
        "Enriched {}/{} | Graduated: {} | Rate: {:.1}% | Elapsed: {}s",
        snapshot.completed,
        snapshot.total,
        snapshot.graduated,
        graduation_rate(snapshot.graduated, snapshot.completed),
        started.elapsed().as_secs()
    );
}

fn log_record(record: &EnrichedTokenRecord) {
    tracing::info!(
        "{} | {} | grad: {:.1}% | complete: {} | mcap: ${:.0} | pool: {}",
        record.mint(),
        record.status,
        record.grad_pct,
        record.complete,
        record.market_cap_usd,
        record.pair_address.as_deref().unwrap_or("-")
    );
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::gates::SourceGates;
    use crate::domain::market::DexPair;
    use crate::ports::mocks::{MockCandles, MockChain, MockMarketData};

    fn orchestrator(market: MockMarketData) -> EnrichmentOrchestrator {
        let enricher = TokenEnricher::new(
            Arc::new(MockChain::new()),
            Arc::new(market),
            Arc::new(MockCandles::new()),
        )
        .with_gates(SourceGates::serial());
        EnrichmentOrchestrator::new(enricher).with_max_workers(4)
    }

    fn launches(n: usize) -> Vec<TokenLaunch> {
        (0..n).map(|i| TokenLaunch::new(format!("mint-{}", i))).collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcomes = orchestrator(MockMarketData::new()).enrich_all(vec![]).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_order_preserved() {
        let market = MockMarketData::new().with_latency(0, 5);
        let outcomes = orchestrator(market).enrich_all(launches(20)).await;

        let mints: Vec<_> = outcomes.iter().map(|o| o.record().mint().to_string()).collect();
        let expected: Vec<_> = (0..20).map(|i| format!("mint-{}", i)).collect();
        assert_eq!(mints, expected);
    }

    #[tokio::test]
    async fn test_panic_isolated() {
        let market = MockMarketData::new()
            .with_panic_on("mint-2")
            .with_pairs(
                "mint-3",
                vec![DexPair {
                    dex_id: "raydium".into(),
                    pair_address: "P".into(),
                    ..Default::default()
                }],
            );
        let outcomes = orchestrator(market).enrich_all(launches(5)).await;

        assert_eq!(outcomes.len(), 5);
        match &outcomes[2] {
            EnrichmentOutcome::Failed { record, error } => {
                assert!(error.contains("simulated provider crash"));
                assert_eq!(record.status, TokenStatus::Dead);
                assert_eq!(record.grad_pct, 0.0);
                assert!(record.enrich_error.is_some());
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert_eq!(outcomes[3].record().status, TokenStatus::Graduated);
        assert_eq!(outcomes.iter().filter(|o| o.is_failed()).count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_rows_fail_in_place() {
        let rows = vec![
            LaunchRow::Valid(TokenLaunch::new("mint-0")),
            LaunchRow::Invalid {
                mint: String::new(),
                error: "invalid launch row 1: missing field `mint`".into(),
            },
            LaunchRow::Valid(TokenLaunch::new("mint-2")),
            LaunchRow::Invalid {
                mint: "mint-3".into(),
                error: "invalid launch row 3: invalid type".into(),
            },
        ];
        let outcomes = orchestrator(MockMarketData::new()).enrich_rows(rows).await;

        assert_eq!(outcomes.len(), 4);
        assert!(!outcomes[0].is_failed());
        assert!(!outcomes[2].is_failed());
        assert_eq!(outcomes[2].record().mint(), "mint-2");

        let failed = outcomes[3].record();
        assert!(outcomes[3].is_failed());
        assert_eq!(failed.mint(), "mint-3");
        assert_eq!(failed.status, TokenStatus::Dead);
        assert!(failed
            .enrich_error
            .as_deref()
            .is_some_and(|e| e.starts_with("invalid launch row 3")));
        assert!(outcomes[1].is_failed());
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(42u8)), "unknown panic payload");
    }

    #[test]
    fn test_progress_counts_graduated() {
        let mut progress = BatchProgress::new(2);
        let snapshot = progress.complete(1, EnrichmentOutcome::failed(TokenLaunch::new("a"), "x"));
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.graduated, 0);
        assert!(progress.slots[1].is_some());
        assert!(progress.slots[0].is_none());
    }
}
