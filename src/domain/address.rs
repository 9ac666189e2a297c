//! Program Address Derivation
//!
//! Deterministic derivation of program-owned account addresses from a
//! program id, a list of seeds and a fixed bump nonce.

use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use thiserror::Error;

/// pump.fun bonding-curve program
pub const PUMP_FUN_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Seed prefix of the bonding-curve account
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";

/// Bump nonce used by pump.fun bonding curves
pub const BONDING_CURVE_NONCE: u8 = 254;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid identifier '{input}': {reason}")]
    InvalidIdentifier { input: String, reason: String },
}

/// Parse a base-58 identifier into its 32 raw bytes.
pub fn parse_identifier(input: &str) -> Result<[u8; 32], AddressError> {
    Pubkey::from_str(input)
        .map(|key| key.to_bytes())
        .map_err(|e| AddressError::InvalidIdentifier {
            input: input.to_string(),
            reason: e.to_string(),
        })
}

/// Hash `seeds || nonce || program_id || marker` and encode the digest as base-58.
///
/// No off-curve check is performed. The caller supplies a known bump, so the
/// result is fully determined by the inputs.
pub fn derive_program_address(seeds: &[&[u8]], program_id: &[u8; 32], nonce: u8) -> String {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([nonce]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let digest: [u8; 32] = hasher.finalize().into();
    Pubkey::new_from_array(digest).to_string()
}

/// Bonding-curve account address for a token mint.
pub fn bonding_curve_address(
    mint: &str,
    program_id: &str,
    seed: &[u8],
    nonce: u8,
) -> Result<String, AddressError> {
    let mint_bytes = parse_identifier(mint)?;
    let program_bytes = parse_identifier(program_id)?;
    Ok(derive_program_address(&[seed, &mint_bytes], &program_bytes, nonce))
}
