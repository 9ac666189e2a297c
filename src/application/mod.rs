//! Application Layer - Enrichment use case
//!
//! Per-token enrichment, source gates and the concurrent batch runner.

pub mod enricher;
pub mod gates;
pub mod orchestrator;

pub use enricher::{ChainLookup, EnricherSettings, TokenEnricher};
pub use gates::SourceGates;
pub use orchestrator::EnrichmentOrchestrator;
