//! Domain Layer - Core logic for graduation detection
//!
//! This module contains pure domain types and logic with no network access.
//! All external interactions happen through the ports layer.
//!
//! - `address`: Program-derived address for a mint's bonding curve
//! - `bonding_curve`: Fixed-layout account decoding and progress
//! - `market`: Pair selection and candle windows
//! - `fusion`: Combining on-chain and market signals into a status
//! - `record`: Input launches and enriched output records
//! - `summary`: Batch aggregates
//! - `persistence`: Reading launches and writing results

pub mod address;
pub mod bonding_curve;
pub mod market;
pub mod fusion;
pub mod record;
pub mod summary;
pub mod persistence;

pub use address::{bonding_curve_address, derive_program_address, AddressError};
pub use bonding_curve::{BondingCurveState, DecodeError, GRADUATION_THRESHOLD_LAMPORTS};
pub use market::{Candle, CandleQuery, CandleWindow, DexPair, MarketSnapshot};
pub use fusion::{fuse, ChainSignal, FusionResult, GraduationSource, TokenStatus};
pub use record::{ChainAccount, EnrichedTokenRecord, EnrichmentOutcome, TokenLaunch};
pub use summary::EnrichmentSummary;
pub use persistence::{load_launches, save_results, LaunchRow, PersistError};
