//! Token Records
//!
//! Input launch rows and the enriched record produced for each of them.

use serde::{Deserialize, Serialize};

use super::bonding_curve::BondingCurveState;
use super::fusion::{ChainSignal, FusionResult, GraduationSource, TokenStatus};
use super::market::{Candle, MarketSnapshot};

/// Token launch row from the upstream scanner
///
/// Unknown fields are ignored so an enriched output file can be read back
/// as input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLaunch {
    /// Token mint address
    pub mint: String,
    /// Creator wallet address
    #[serde(default)]
    pub creator: Option<String>,
    /// Creation transaction signature
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub slot: Option<u64>,
    /// Unix timestamp of the creation block
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl TokenLaunch {
    pub fn new(mint: impl Into<String>) -> Self {
        Self {
            mint: mint.into(),
            creator: None,
            signature: None,
            slot: None,
            block_time: None,
        }
    }

    pub fn with_block_time(mut self, block_time: i64) -> Self {
        self.block_time = Some(block_time);
        self
    }
}

/// What the RPC said about the bonding-curve account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainAccount {
    Present,
    Closed,
    Unavailable,
}

impl From<&ChainSignal> for ChainAccount {
    fn from(signal: &ChainSignal) -> Self {
        match signal {
            ChainSignal::Present(_) => ChainAccount::Present,
            ChainSignal::Closed => ChainAccount::Closed,
            ChainSignal::Unavailable => ChainAccount::Unavailable,
        }
    }
}

/// Enriched output record, one per input launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTokenRecord {
    #[serde(flatten)]
    pub launch: TokenLaunch,

    pub graduated: bool,
    pub complete: bool,
    pub grad_pct: f64,
    pub status: TokenStatus,
    pub graduation_source: GraduationSource,

    // On-chain
    pub bonding_curve_pda: Option<String>,
    pub chain_account: ChainAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_error: Option<String>,
    pub virtual_token_reserves: Option<u64>,
    pub virtual_sol_reserves: Option<u64>,
    pub real_token_reserves: Option<u64>,
    pub real_sol_reserves: Option<u64>,
    pub token_total_supply: Option<u64>,

    // Market
    pub pair_address: Option<String>,
    pub dex_id: Option<String>,
    pub market_cap_usd: f64,
    pub fdv: f64,
    pub liquidity_usd: f64,
    pub price_usd: f64,
    pub pair_created_at: Option<i64>,

    #[serde(default)]
    pub hourly_prices_24h: Vec<Candle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrich_error: Option<String>,
}

impl EnrichedTokenRecord {
    /// Blank record: no signals, dead.
    pub fn new(launch: TokenLaunch) -> Self {
        Self {
            launch,
            graduated: false,
            complete: false,
            grad_pct: 0.0,
            status: TokenStatus::Dead,
            graduation_source: GraduationSource::NoSignal,
            bonding_curve_pda: None,
            chain_account: ChainAccount::Unavailable,
            chain_error: None,
            virtual_token_reserves: None,
            virtual_sol_reserves: None,
            real_token_reserves: None,
            real_sol_reserves: None,
            token_total_supply: None,
            pair_address: None,
            dex_id: None,
            market_cap_usd: 0.0,
            fdv: 0.0,
            liquidity_usd: 0.0,
            price_usd: 0.0,
            pair_created_at: None,
            hourly_prices_24h: Vec::new(),
            enrich_error: None,
        }
    }

    /// Record for a unit of work that did not complete.
    pub fn failed(launch: TokenLaunch, error: impl Into<String>) -> Self {
        let mut record = Self::new(launch);
        record.enrich_error = Some(error.into());
        record
    }

    pub fn mint(&self) -> &str {
        &self.launch.mint
    }

    pub fn with_pda(mut self, pda: Option<String>) -> Self {
        self.bonding_curve_pda = pda;
        self
    }

    pub fn with_chain(mut self, signal: &ChainSignal, error: Option<String>) -> Self {
        self.chain_account = ChainAccount::from(signal);
        self.chain_error = error;
        if let Some(state) = signal.state() {
            self.apply_curve(state);
        }
        self
    }

    pub fn with_market(mut self, snapshot: Option<&MarketSnapshot>) -> Self {
        if let Some(m) = snapshot {
            self.pair_address = m.pair_address.clone();
            self.dex_id = Some(m.dex_id.clone());
            self.market_cap_usd = m.market_cap_usd;
            self.fdv = m.fdv;
            self.liquidity_usd = m.liquidity_usd;
            self.price_usd = m.price_usd;
            self.pair_created_at = m.pair_created_at;
        }
        self
    }

    pub fn with_fusion(mut self, fusion: &FusionResult) -> Self {
        self.status = fusion.status;
        self.graduated = fusion.graduated;
        self.grad_pct = fusion.grad_pct;
        self.graduation_source = fusion.source;
        self
    }

    pub fn with_candles(mut self, candles: Vec<Candle>) -> Self {
        self.hourly_prices_24h = candles;
        self
    }

    fn apply_curve(&mut self, state: &BondingCurveState) {
        self.complete = state.complete;
        self.virtual_token_reserves = Some(state.virtual_token_reserves);
        self.virtual_sol_reserves = Some(state.virtual_sol_reserves);
        self.real_token_reserves = Some(state.real_token_reserves);
        self.real_sol_reserves = Some(state.real_sol_reserves);
        self.token_total_supply = Some(state.token_total_supply);
    }
}

/// Result of one unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Enriched(EnrichedTokenRecord),
    /// The unit panicked or was cancelled; the record is the dead fallback
    Failed {
        record: EnrichedTokenRecord,
        error: String,
    },
}

impl EnrichmentOutcome {
    pub fn failed(launch: TokenLaunch, error: impl Into<String>) -> Self {
        let error = error.into();
        EnrichmentOutcome::Failed {
            record: EnrichedTokenRecord::failed(launch, error.clone()),
            error,
        }
    }

    pub fn record(&self) -> &EnrichedTokenRecord {
        match self {
            EnrichmentOutcome::Enriched(record) => record,
            EnrichmentOutcome::Failed { record, .. } => record,
        }
    }

    pub fn into_record(self) -> EnrichedTokenRecord {
        match self {
            EnrichmentOutcome::Enriched(record) => record,
            EnrichmentOutcome::Failed { record, .. } => record,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EnrichmentOutcome::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_launch_ignores_extra_fields() {
        let row = json!({
            "mint": "MintA",
            "creator": "Creator",
            "slot": 250_000_000u64,
            "block_time": 1_700_000_000i64,
            "status": "graduated",
            "hourly_prices_24h": []
        });
        let launch: TokenLaunch = serde_json::from_value(row).unwrap();
        assert_eq!(launch.mint, "MintA");
        assert_eq!(launch.block_time, Some(1_700_000_000));
        assert!(launch.signature.is_none());
    }

    #[test]
    fn test_failed_record_defaults() {
        let outcome = EnrichmentOutcome::failed(TokenLaunch::new("MintA"), "boom");
        assert!(outcome.is_failed());
        let record = outcome.record();
        assert_eq!(record.status, TokenStatus::Dead);
        assert_eq!(record.grad_pct, 0.0);
        assert!(!record.graduated);
        assert_eq!(record.enrich_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_record_flattens_launch() {
        let record = EnrichedTokenRecord::new(TokenLaunch::new("MintA").with_block_time(5));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["mint"], "MintA");
        assert_eq!(value["block_time"], 5);
        assert_eq!(value["status"], "dead");
        assert_eq!(value["chain_account"], "unavailable");
        assert!(value.get("enrich_error").is_none());

        let back: EnrichedTokenRecord = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(back, record);

        let relaunch: TokenLaunch = serde_json::from_value(value).unwrap();
        assert_eq!(relaunch, record.launch);
    }

    #[test]
    fn test_chain_state_copied() {
        let state = BondingCurveState {
            virtual_token_reserves: 1,
            virtual_sol_reserves: 2,
            real_token_reserves: 3,
            real_sol_reserves: 4,
            token_total_supply: 5,
            complete: true,
        };
        let record = EnrichedTokenRecord::new(TokenLaunch::new("M"))
            .with_chain(&ChainSignal::Present(state), None);
        assert!(record.complete);
        assert_eq!(record.chain_account, ChainAccount::Present);
        assert_eq!(record.real_sol_reserves, Some(4));
    }
}
