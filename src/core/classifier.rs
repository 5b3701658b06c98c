//! Address classification
//!
//! Chain family is decided from syntax alone. EVM is checked first:
//! `0x` + 40 hex digits can never be valid base58 (`0` is outside the
//! base58 alphabet), so the two accept-patterns never overlap.

use crate::models::{AppError, AppResult, ChainFamily, TokenAddress};
use crate::utils::constants::{EVM_ADDRESS_HEX_LEN, SOLANA_ADDRESS_MAX_LEN, SOLANA_ADDRESS_MIN_LEN};

/// `0x` followed by exactly 40 hex digits
pub fn is_bnb_address(raw: &str) -> bool {
    match raw.strip_prefix("0x") {
        Some(body) => body.len() == EVM_ADDRESS_HEX_LEN && hex::decode(body).is_ok(),
        None => false,
    }
}

/// Base58 alphabet, 32 to 44 characters
pub fn is_solana_address(raw: &str) -> bool {
    (SOLANA_ADDRESS_MIN_LEN..=SOLANA_ADDRESS_MAX_LEN).contains(&raw.len())
        && bs58::decode(raw).into_vec().is_ok()
}

/// Classify a raw address. No I/O.
pub fn classify(raw: &str) -> AppResult<TokenAddress> {
    let trimmed = raw.trim();

    if is_bnb_address(trimmed) {
        return Ok(TokenAddress::new(trimmed, ChainFamily::BnbChain));
    }
    if is_solana_address(trimmed) {
        return Ok(TokenAddress::new(trimmed, ChainFamily::Solana));
    }

    Err(AppError::invalid_address(format!(
        "'{}' is neither a BNB Chain (0x + 40 hex) nor a Solana (base58) address",
        trimmed
    )))
}
