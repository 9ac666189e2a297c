//! Batch Summary

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::fusion::TokenStatus;
use super::record::EnrichmentOutcome;

pub const DETECTION_METHOD: &str = "on_chain_bonding_curve_pda";

/// Aggregate counts for one enrichment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub total_launched: usize,
    pub total_graduated: usize,
    pub total_active: usize,
    pub total_dead: usize,
    /// Units that panicked; also counted in `total_dead`
    pub total_failed: usize,
    /// Percentage of launched tokens that graduated, 2 decimals
    pub graduation_rate_pct: f64,
    pub method: String,
    /// Unix seconds
    pub enriched_at: i64,
}

impl EnrichmentSummary {
    pub fn from_outcomes(outcomes: &[EnrichmentOutcome]) -> Self {
        let mut summary = Self {
            total_launched: outcomes.len(),
            total_graduated: 0,
            total_active: 0,
            total_dead: 0,
            total_failed: 0,
            graduation_rate_pct: 0.0,
            method: DETECTION_METHOD.to_string(),
            enriched_at: Utc::now().timestamp(),
        };

        for outcome in outcomes {
            if outcome.is_failed() {
                summary.total_failed += 1;
            }
            match outcome.record().status {
                TokenStatus::Graduated => summary.total_graduated += 1,
                TokenStatus::Active => summary.total_active += 1,
                TokenStatus::Dead => summary.total_dead += 1,
            }
        }

        summary.graduation_rate_pct = graduation_rate(summary.total_graduated, summary.total_launched);
        summary
    }
}

/// `graduated / total * 100`, rounded to 2 decimals; 0 for an empty batch.
pub fn graduation_rate(graduated: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = graduated as f64 / total as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}
