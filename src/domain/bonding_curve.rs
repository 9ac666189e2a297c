//! Bonding Curve Account
//!
//! Decoding of the fixed-layout pump.fun bonding-curve account and the
//! graduation progress derived from it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// SOL raised (in lamports) at which a curve completes
pub const GRADUATION_THRESHOLD_LAMPORTS: u64 = 85_000_000_000;

/// Minimum account length: 8-byte discriminator, five u64 fields, one bool
pub const MIN_ACCOUNT_LEN: usize = 49;

const VIRTUAL_TOKEN_OFFSET: usize = 8;
const VIRTUAL_SOL_OFFSET: usize = 16;
const REAL_TOKEN_OFFSET: usize = 24;
const REAL_SOL_OFFSET: usize = 32;
const TOTAL_SUPPLY_OFFSET: usize = 40;
const COMPLETE_OFFSET: usize = 48;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Account data too short: {len} bytes (need {min})", min = MIN_ACCOUNT_LEN)]
    TooShort { len: usize },

    #[error("Malformed account encoding: {0}")]
    MalformedEncoding(String),
}

/// Bonding curve state for a pump.fun token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondingCurveState {
    /// Virtual token reserves
    pub virtual_token_reserves: u64,
    /// Virtual SOL reserves
    pub virtual_sol_reserves: u64,
    /// Real token reserves (actual tokens in curve)
    pub real_token_reserves: u64,
    /// Real SOL reserves (actual SOL in curve)
    pub real_sol_reserves: u64,
    /// Token total supply
    pub token_total_supply: u64,
    /// Whether the bonding curve has completed (token graduated)
    pub complete: bool,
}

impl BondingCurveState {
    /// Decode raw account bytes.
    ///
    /// Offsets are fixed; the discriminator at offset 0 is not checked and
    /// trailing bytes are ignored.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        if raw.len() < MIN_ACCOUNT_LEN {
            return Err(DecodeError::TooShort { len: raw.len() });
        }

        Ok(Self {
            virtual_token_reserves: read_u64(raw, VIRTUAL_TOKEN_OFFSET),
            virtual_sol_reserves: read_u64(raw, VIRTUAL_SOL_OFFSET),
            real_token_reserves: read_u64(raw, REAL_TOKEN_OFFSET),
            real_sol_reserves: read_u64(raw, REAL_SOL_OFFSET),
            token_total_supply: read_u64(raw, TOTAL_SUPPLY_OFFSET),
            complete: raw[COMPLETE_OFFSET] != 0,
        })
    }

    /// Decode the base64 `data[0]` payload returned by `getAccountInfo`.
    pub fn from_base64(data: &str) -> Result<Self, DecodeError> {
        let raw = STANDARD
            .decode(data.trim())
            .map_err(|e| DecodeError::MalformedEncoding(e.to_string()))?;
        Self::decode(&raw)
    }

    /// Graduation progress in [0, 100]. Not rounded.
    pub fn grad_pct(&self) -> f64 {
        if self.complete {
            return 100.0;
        }
        let pct = self.real_sol_reserves as f64 * 100.0 / GRADUATION_THRESHOLD_LAMPORTS as f64;
        pct.min(100.0)
    }

    pub fn graduated(&self) -> bool {
        self.complete
    }
}

fn read_u64(raw: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&raw[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
pub(crate) fn encode_account(state: &BondingCurveState, len: usize) -> Vec<u8> {
    let mut raw = vec![0u8; len.max(MIN_ACCOUNT_LEN)];
    raw[..8].copy_from_slice(&[0x17, 0xb7, 0xf8, 0x37, 0x60, 0xd8, 0xac, 0x60]);
    raw[8..16].copy_from_slice(&state.virtual_token_reserves.to_le_bytes());
    raw[16..24].copy_from_slice(&state.virtual_sol_reserves.to_le_bytes());
    raw[24..32].copy_from_slice(&state.real_token_reserves.to_le_bytes());
    raw[32..40].copy_from_slice(&state.real_sol_reserves.to_le_bytes());
    raw[40..48].copy_from_slice(&state.token_total_supply.to_le_bytes());
    raw[48] = state.complete as u8;
    raw.truncate(len);
    raw
}
