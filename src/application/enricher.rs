//! Token Enricher
//!
//! One unit of work: derive the bonding-curve address, read and decode the
//! account, look up market pairs, fuse the signals, and fetch candles for
//! graduated pools. Source failures degrade the record, never abort it.

use std::sync::Arc;

use super::gates::SourceGates;
use crate::domain::address::{
    bonding_curve_address, BONDING_CURVE_NONCE, BONDING_CURVE_SEED, PUMP_FUN_PROGRAM_ID,
};
use crate::domain::bonding_curve::BondingCurveState;
use crate::domain::fusion::{fuse, ChainSignal, TokenStatus};
use crate::domain::market::{select_snapshot, Candle, CandleWindow, MarketSnapshot};
use crate::domain::record::{EnrichedTokenRecord, TokenLaunch};
use crate::ports::{AccountFetch, CandlePort, ChainPort, MarketDataPort};

/// Enricher configuration
#[derive(Debug, Clone)]
pub struct EnricherSettings {
    /// Bonding-curve program
    pub program_id: String,
    pub bonding_curve_seed: Vec<u8>,
    pub bonding_curve_nonce: u8,
    /// Exchanges whose pools count as graduation
    pub graduation_dex_ids: Vec<String>,
    pub candles: CandleWindow,
}

impl Default for EnricherSettings {
    fn default() -> Self {
        Self {
            program_id: PUMP_FUN_PROGRAM_ID.to_string(),
            bonding_curve_seed: BONDING_CURVE_SEED.to_vec(),
            bonding_curve_nonce: BONDING_CURVE_NONCE,
            graduation_dex_ids: vec!["raydium".to_string()],
            candles: CandleWindow::default(),
        }
    }
}

/// On-chain lookup result for one mint
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLookup {
    pub pda: Option<String>,
    pub signal: ChainSignal,
    pub error: Option<String>,
}

pub struct TokenEnricher {
    chain: Arc<dyn ChainPort>,
    market: Arc<dyn MarketDataPort>,
    candles: Arc<dyn CandlePort>,
    gates: SourceGates,
    settings: EnricherSettings,
}

impl TokenEnricher {
    pub fn new(
        chain: Arc<dyn ChainPort>,
        market: Arc<dyn MarketDataPort>,
        candles: Arc<dyn CandlePort>,
    ) -> Self {
        Self {
            chain,
            market,
            candles,
            gates: SourceGates::default(),
            settings: EnricherSettings::default(),
        }
    }

    pub fn with_gates(mut self, gates: SourceGates) -> Self {
        self.gates = gates;
        self
    }

    pub fn with_settings(mut self, settings: EnricherSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EnricherSettings {
        &self.settings
    }

    pub async fn enrich(&self, launch: TokenLaunch) -> EnrichedTokenRecord {
        let lookup = self.lookup_chain(&launch.mint).await;
        let snapshot = self.lookup_market(&launch.mint).await;
        let fusion = fuse(&lookup.signal, snapshot.as_ref());

        let candles = if fusion.status == TokenStatus::Graduated {
            self.lookup_candles(snapshot.as_ref(), launch.block_time).await
        } else {
            Vec::new()
        };

        tracing::debug!(
            "{}: {} ({:.1}%, {:?})",
            launch.mint,
            fusion.status,
            fusion.grad_pct,
            fusion.source
        );

        EnrichedTokenRecord::new(launch)
            .with_pda(lookup.pda)
            .with_chain(&lookup.signal, lookup.error)
            .with_market(snapshot.as_ref())
            .with_fusion(&fusion)
            .with_candles(candles)
    }

    /// Derive, fetch and decode the bonding-curve account.
    pub async fn lookup_chain(&self, mint: &str) -> ChainLookup {
        let pda = match bonding_curve_address(
            mint,
            &self.settings.program_id,
            &self.settings.bonding_curve_seed,
            self.settings.bonding_curve_nonce,
        ) {
            Ok(pda) => pda,
            Err(e) => {
                tracing::debug!("Skipping chain lookup for {}: {}", mint, e);
                return ChainLookup {
                    pda: None,
                    signal: ChainSignal::Unavailable,
                    error: Some(e.to_string()),
                };
            }
        };

        let fetched = {
            match self.gates.chain().await {
                Some(_permit) => self.chain.fetch_account(&pda).await,
                None => AccountFetch::Unavailable,
            }
        };

        let (signal, error) = match fetched {
            AccountFetch::Found(data) => match BondingCurveState::from_base64(&data) {
                Ok(state) => (ChainSignal::Present(state), None),
                Err(e) => {
                    tracing::debug!("Bonding curve {} for {} did not decode: {}", pda, mint, e);
                    (ChainSignal::Unavailable, Some(e.to_string()))
                }
            },
            AccountFetch::Closed => (ChainSignal::Closed, None),
            AccountFetch::Unavailable => (ChainSignal::Unavailable, None),
        };

        ChainLookup {
            pda: Some(pda),
            signal,
            error,
        }
    }

    pub async fn lookup_market(&self, mint: &str) -> Option<MarketSnapshot> {
        let pairs = {
            let _permit = self.gates.market().await?;
            self.market.token_pairs(mint).await?
        };
        select_snapshot(&pairs, &self.settings.graduation_dex_ids)
    }

    /// Candles for the first window after launch. Empty without a pool address
    /// or a launch time, or when the provider is unavailable.
    pub async fn lookup_candles(&self, snapshot: Option<&MarketSnapshot>, block_time: Option<i64>) -> Vec<Candle> {
        let (Some(pool), Some(block_time)) = (snapshot.and_then(|s| s.pair_address.as_deref()), block_time) else {
            return Vec::new();
        };

        let window = &self.settings.candles;
        let Some(query) = window.query(block_time) else {
            tracing::debug!("Candle window out of range for block time {}", block_time);
            return Vec::new();
        };

        let fetched = {
            match self.gates.candles().await {
                Some(_permit) => self.candles.ohlcv(pool, query).await,
                None => None,
            }
        };

        fetched
            .map(|candles| window.trim(candles, block_time))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::parse_identifier;
    use crate::domain::bonding_curve::encode_account;
    use crate::domain::fusion::GraduationSource;
    use crate::domain::market::DexPair;
    use crate::domain::record::ChainAccount;
    use crate::ports::chain::MockChainPort;
    use crate::ports::market_data::{MockCandlePort, MockMarketDataPort};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use mockall::predicate::eq;

    const MINT: &str = "So11111111111111111111111111111111111111112";

    fn curve_data(real_sol: u64, complete: bool) -> String {
        let state = BondingCurveState {
            virtual_token_reserves: 1_000,
            virtual_sol_reserves: 2_000,
            real_token_reserves: 3_000,
            real_sol_reserves: real_sol,
            token_total_supply: 1_000_000,
            complete,
        };
        STANDARD.encode(encode_account(&state, 49))
    }

    fn expected_pda() -> String {
        bonding_curve_address(MINT, PUMP_FUN_PROGRAM_ID, BONDING_CURVE_SEED, BONDING_CURVE_NONCE).unwrap()
    }

    fn raydium_pair(mcap: f64) -> DexPair {
        DexPair {
            dex_id: "raydium".into(),
            pair_address: "PoolR".into(),
            market_cap_usd: mcap,
            ..Default::default()
        }
    }

    fn enricher(chain: MockChainPort, market: MockMarketDataPort, candles: MockCandlePort) -> TokenEnricher {
        TokenEnricher::new(Arc::new(chain), Arc::new(market), Arc::new(candles))
    }

    #[tokio::test]
    async fn test_closed_account_with_raydium_pool() {
        let mut chain = MockChainPort::new();
        chain
            .expect_fetch_account()
            .with(eq(expected_pda()))
            .times(1)
            .returning(|_| AccountFetch::Closed);

        let mut market = MockMarketDataPort::new();
        market
            .expect_token_pairs()
            .returning(|_| Some(vec![raydium_pair(150_000.0)]));

        let mut candles = MockCandlePort::new();
        candles
            .expect_ohlcv()
            .withf(|pool, query| pool == "PoolR" && query.before_timestamp == 1_000 + 86_400)
            .times(1)
            .returning(|_, _| Some(vec![Candle::from([4_600.0, 1.0, 2.0, 0.5, 1.5, 10.0])]));

        let record = enricher(chain, market, candles)
            .enrich(TokenLaunch::new(MINT).with_block_time(1_000))
            .await;

        assert_eq!(record.status, TokenStatus::Graduated);
        assert_eq!(record.grad_pct, 100.0);
        assert_eq!(record.market_cap_usd, 150_000.0);
        assert_eq!(record.pair_address.as_deref(), Some("PoolR"));
        assert_eq!(record.chain_account, ChainAccount::Closed);
        assert_eq!(record.graduation_source, GraduationSource::MarketPool);
        assert_eq!(record.hourly_prices_24h.len(), 1);
    }

    #[tokio::test]
    async fn test_half_curve_no_pairs_is_active_without_candles() {
        let mut chain = MockChainPort::new();
        chain
            .expect_fetch_account()
            .returning(|_| AccountFetch::Found(curve_data(42_500_000_000, false)));

        let mut market = MockMarketDataPort::new();
        market.expect_token_pairs().returning(|_| Some(vec![]));

        let mut candles = MockCandlePort::new();
        candles.expect_ohlcv().times(0);

        let record = enricher(chain, market, candles)
            .enrich(TokenLaunch::new(MINT).with_block_time(1_000))
            .await;

        assert_eq!(record.status, TokenStatus::Active);
        assert!((record.grad_pct - 50.0).abs() < 1e-9);
        assert_eq!(record.real_sol_reserves, Some(42_500_000_000));
        assert_eq!(record.bonding_curve_pda, Some(expected_pda()));
        assert!(record.hourly_prices_24h.is_empty());
    }

    #[tokio::test]
    async fn test_complete_curve_without_pool_skips_candles() {
        let mut chain = MockChainPort::new();
        chain
            .expect_fetch_account()
            .returning(|_| AccountFetch::Found(curve_data(0, true)));

        let mut market = MockMarketDataPort::new();
        market.expect_token_pairs().returning(|_| None);

        let mut candles = MockCandlePort::new();
        candles.expect_ohlcv().times(0);

        let record = enricher(chain, market, candles)
            .enrich(TokenLaunch::new(MINT).with_block_time(1_000))
            .await;

        assert_eq!(record.status, TokenStatus::Graduated);
        assert!(record.complete);
        assert_eq!(record.graduation_source, GraduationSource::OnChainComplete);
        assert!(record.pair_address.is_none());
    }

    #[tokio::test]
    async fn test_candle_failure_keeps_graduated() {
        let mut chain = MockChainPort::new();
        chain.expect_fetch_account().returning(|_| AccountFetch::Closed);

        let mut market = MockMarketDataPort::new();
        market
            .expect_token_pairs()
            .returning(|_| Some(vec![raydium_pair(1.0)]));

        let mut candles = MockCandlePort::new();
        candles.expect_ohlcv().returning(|_, _| None);

        let record = enricher(chain, market, candles)
            .enrich(TokenLaunch::new(MINT).with_block_time(1_000))
            .await;

        assert_eq!(record.status, TokenStatus::Graduated);
        assert!(record.hourly_prices_24h.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_mint_degrades_chain_signal() {
        let mut chain = MockChainPort::new();
        chain.expect_fetch_account().times(0);

        let mut market = MockMarketDataPort::new();
        market.expect_token_pairs().returning(|_| Some(vec![]));

        let record = enricher(chain, market, MockCandlePort::new())
            .enrich(TokenLaunch::new("not a mint"))
            .await;

        assert_eq!(record.status, TokenStatus::Dead);
        assert_eq!(record.chain_account, ChainAccount::Unavailable);
        assert!(record.chain_error.is_some());
        assert!(record.bonding_curve_pda.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_account_is_unavailable() {
        let mut chain = MockChainPort::new();
        chain
            .expect_fetch_account()
            .returning(|_| AccountFetch::Found(STANDARD.encode([0u8; 20])));

        let mut market = MockMarketDataPort::new();
        market.expect_token_pairs().returning(|_| None);

        let lookup = enricher(chain, market, MockCandlePort::new())
            .lookup_chain(MINT)
            .await;

        assert_eq!(lookup.signal, ChainSignal::Unavailable);
        assert!(lookup.error.unwrap().contains("too short"));
        assert!(parse_identifier(&lookup.pda.unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_no_block_time_skips_candles() {
        let mut candles = MockCandlePort::new();
        candles.expect_ohlcv().times(0);

        let snapshot = MarketSnapshot {
            graduated: true,
            pair_address: Some("PoolR".into()),
            ..Default::default()
        };
        let result = enricher(MockChainPort::new(), MockMarketDataPort::new(), candles)
            .lookup_candles(Some(&snapshot), None)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_block_time_overflow_skips_candles() {
        let mut chain = MockChainPort::new();
        chain.expect_fetch_account().returning(|_| AccountFetch::Closed);

        let mut market = MockMarketDataPort::new();
        market
            .expect_token_pairs()
            .returning(|_| Some(vec![raydium_pair(150_000.0)]));

        let mut candles = MockCandlePort::new();
        candles.expect_ohlcv().times(0);

        let record = enricher(chain, market, candles)
            .enrich(TokenLaunch::new(MINT).with_block_time(i64::MAX - 10))
            .await;

        assert_eq!(record.status, TokenStatus::Graduated);
        assert_eq!(record.graduation_source, GraduationSource::MarketPool);
        assert!(record.hourly_prices_24h.is_empty());
    }
}
