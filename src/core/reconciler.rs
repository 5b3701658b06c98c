//! Data reconciliation
//!
//! Folds the provider results of one scan into a `TokenSnapshot` using
//! per-field precedence. Total: every combination of absent inputs still
//! yields a valid snapshot.

use alloy_primitives::U256;

use crate::models::{
    Fundamentals, MarketData, MarketQuote, ProviderResult, SecurityCoverage, SecurityReport,
    TokenAddress, TokenSnapshot, TweetCollection,
};
use crate::utils::constants::{PLACEHOLDER_TOKEN_NAME, PLACEHOLDER_TOKEN_SYMBOL};

/// Price decimal places handled exactly; longer expansions fall back to float math
const MAX_EXACT_PRICE_SCALE: usize = 40;

/// Everything the fan-out produced for one address
#[derive(Debug, Clone)]
pub struct ProviderOutputs {
    pub market: ProviderResult<MarketQuote>,
    pub fundamentals: ProviderResult<Fundamentals>,
    /// `None` when the chain has no security provider
    pub security: Option<ProviderResult<SecurityReport>>,
    pub holders: ProviderResult<u64>,
}

/// Merge provider outputs into a fresh snapshot with no social data or scores yet
pub fn reconcile(address: TokenAddress, outputs: ProviderOutputs) -> TokenSnapshot {
    let quote = outputs.market.value.unwrap_or_default();
    let fundamentals = outputs.fundamentals.value;
    let chain = address.chain();

    let name = first_present(&[
        quote.name.as_deref(),
        fundamentals.as_ref().and_then(|f| f.name.as_deref()),
    ])
    .unwrap_or(PLACEHOLDER_TOKEN_NAME)
    .to_string();

    let symbol = first_present(&[
        quote.symbol.as_deref(),
        fundamentals.as_ref().and_then(|f| f.symbol.as_deref()),
    ])
    .unwrap_or(PLACEHOLDER_TOKEN_SYMBOL)
    .to_string();

    let holder_count = outputs
        .holders
        .value
        .or_else(|| fundamentals.as_ref().and_then(|f| f.holder_count));

    let decimals = fundamentals
        .as_ref()
        .and_then(|f| f.decimals)
        .unwrap_or_else(|| chain.default_decimals());

    let supply = fundamentals.as_ref().and_then(|f| f.supply);
    let mut market = quote.market;
    if market.market_cap.is_none() {
        market.market_cap = match (supply, market.price_usd) {
            (Some(supply), Some(price)) => compute_market_cap(supply, price, decimals),
            _ => None,
        };
    }

    let secondary_market = fundamentals
        .as_ref()
        .and_then(|f| f.price_usd)
        .map(|price| MarketData {
            price_usd: Some(price),
            market_cap: supply.and_then(|s| compute_market_cap(s, price, decimals)),
            ..Default::default()
        });

    let security = match outputs.security {
        None => SecurityCoverage::Unsupported,
        Some(ProviderResult { value: None, .. }) => SecurityCoverage::Unavailable,
        Some(ProviderResult {
            value: Some(report), ..
        }) => SecurityCoverage::Report(report),
    };

    let socials = match &fundamentals {
        Some(f) => quote.socials.backfill(&f.socials),
        None => quote.socials,
    };

    TokenSnapshot {
        address,
        name,
        symbol,
        market,
        secondary_market,
        fundamentals,
        holder_count,
        decimals,
        security,
        socials,
        twitter: TweetCollection::no_data(),
        ticker_tweets: TweetCollection::no_data(),
        sentiment_score: None,
        token_score: None,
    }
}

fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

/// `supply × price / 10^decimals`.
///
/// The price is taken at its exact shortest decimal expansion and multiplied
/// into the integer supply as a `U256`, so a tiny price never rounds to zero
/// before the division.
pub fn compute_market_cap(supply: U256, price_usd: f64, decimals: u8) -> Option<f64> {
    if supply.is_zero() || !price_usd.is_finite() || price_usd <= 0.0 {
        return None;
    }

    let exact = decimal_mantissa(price_usd).and_then(|(mantissa, scale)| {
        let numerator = supply.checked_mul(mantissa)?;
        let value = u256_to_f64(numerator)? / 10f64.powi(i32::from(decimals)) / 10f64.powi(scale as i32);
        Some(value)
    });

    let cap = match exact {
        Some(cap) => cap,
        // Product overflowed 256 bits
        None => u256_to_f64(supply)? * price_usd / 10f64.powi(i32::from(decimals)),
    };
    (cap.is_finite() && cap > 0.0).then_some(cap)
}

/// `0.00123` -> (123, 5)
fn decimal_mantissa(value: f64) -> Option<(U256, usize)> {
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() > MAX_EXACT_PRICE_SCALE {
        return None;
    }
    let digits = format!("{}{}", int_part, frac_part);
    let mantissa = U256::from_str_radix(&digits, 10).ok()?;
    Some((mantissa, frac_part.len()))
}

fn u256_to_f64(value: U256) -> Option<f64> {
    value.to_string().parse::<f64>().ok()
}
