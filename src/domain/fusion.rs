//! Graduation Fusion
//!
//! Combines the on-chain bonding-curve signal with the off-chain market
//! snapshot into a single status. Rules, in precedence order:
//!
//! 1. On-chain `complete` flag: graduated, 100%.
//! 2. A pool on a graduation exchange: graduated, 100%.
//! 3. Bonding-curve progress: active at 5% or more, otherwise dead.
//!
//! A closed or unreachable curve account never implies graduation on its own.

use serde::{Deserialize, Serialize};

use super::bonding_curve::BondingCurveState;
use super::market::MarketSnapshot;

/// Minimum curve progress for a non-graduated token to count as active
pub const ACTIVE_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Graduated,
    Active,
    Dead,
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenStatus::Graduated => "graduated",
            TokenStatus::Active => "active",
            TokenStatus::Dead => "dead",
        };
        write!(f, "{}", s)
    }
}

/// Which rule decided the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraduationSource {
    OnChainComplete,
    MarketPool,
    BondingCurveProgress,
    NoSignal,
}

/// On-chain input to fusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChainSignal {
    /// Account decoded
    Present(BondingCurveState),
    /// RPC answered that the account does not exist
    Closed,
    /// Request failed, or the address/data could not be processed
    Unavailable,
}

impl ChainSignal {
    pub fn state(&self) -> Option<&BondingCurveState> {
        match self {
            ChainSignal::Present(state) => Some(state),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionResult {
    pub status: TokenStatus,
    pub graduated: bool,
    pub grad_pct: f64,
    pub source: GraduationSource,
}

pub fn fuse(chain: &ChainSignal, market: Option<&MarketSnapshot>) -> FusionResult {
    if let Some(state) = chain.state() {
        if state.complete {
            return graduated(GraduationSource::OnChainComplete);
        }
    }

    if market.map(|m| m.graduated).unwrap_or(false) {
        return graduated(GraduationSource::MarketPool);
    }

    let (grad_pct, source) = match chain.state() {
        Some(state) => (state.grad_pct(), GraduationSource::BondingCurveProgress),
        None => (0.0, GraduationSource::NoSignal),
    };

    let status = if grad_pct >= ACTIVE_THRESHOLD_PCT {
        TokenStatus::Active
    } else {
        TokenStatus::Dead
    };

    FusionResult {
        status,
        graduated: false,
        grad_pct,
        source,
    }
}

fn graduated(source: GraduationSource) -> FusionResult {
    FusionResult {
        status: TokenStatus::Graduated,
        graduated: true,
        grad_pct: 100.0,
        source,
    }
}
