//! Scanner configuration
//!
//! Everything comes from environment variables with defaults from
//! `utils/constants.rs`. Invalid numbers fall back to the default with a
//! warning; API keys are never logged.

use std::time::Duration;

use tracing::warn;

use crate::core::token_score::ScoreLimits;
use crate::models::ErrorCode;
use crate::utils::constants::{
    DEFAULT_BSC_RPC_URL, DEFAULT_CACHE_TTL_SECS, DEFAULT_DEXSCREENER_URL, DEFAULT_NITTER_MIRRORS,
    DEFAULT_RUGCHECK_URL, DEFAULT_SCRAPER_API_URL, DEFAULT_SOLANA_RPC_URL, MAX_CONCURRENT_SCRAPES,
    PROVIDER_TIMEOUT_SECS, SCRAPE_TIMEOUT_SECS,
};

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub dexscreener_url: String,
    pub solana_rpc_url: String,
    /// DAS-capable endpoint for Solana metadata; DAS lookups are skipped without it
    pub solana_das_url: Option<String>,
    pub bsc_rpc_url: String,
    pub rugcheck_url: String,
    pub moralis_api_key: Option<String>,
    pub scraper_api_url: String,
    pub scraper_api_key: Option<String>,
    pub nitter_mirrors: Vec<String>,
    pub max_concurrent_scrapes: usize,
    pub provider_timeout: Duration,
    pub scrape_timeout: Duration,
    pub narrative_api_url: Option<String>,
    pub narrative_api_key: Option<String>,
    pub cache_ttl_secs: u64,
    pub host: String,
    pub port: u16,
    pub score_limits: ScoreLimits,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ScannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let nitter_mirrors = get("NITTER_MIRRORS")
            .map(|raw| {
                raw.split(',')
                    .map(|m| m.trim().trim_end_matches('/').to_string())
                    .filter(|m| !m.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|mirrors| !mirrors.is_empty())
            .unwrap_or_else(|| DEFAULT_NITTER_MIRRORS.iter().map(|m| m.to_string()).collect());

        let port = get("PORT")
            .or_else(|| get("RUSTER_PORT"))
            .map(|raw| parse_or("PORT", Some(raw), 3000u16))
            .unwrap_or(3000);

        Self {
            dexscreener_url: string_or("DEXSCREENER_API_URL", DEFAULT_DEXSCREENER_URL),
            solana_rpc_url: string_or("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            solana_das_url: get("SOLANA_DAS_URL"),
            bsc_rpc_url: string_or("BSC_RPC_URL", DEFAULT_BSC_RPC_URL),
            rugcheck_url: string_or("RUGCHECK_API_URL", DEFAULT_RUGCHECK_URL),
            moralis_api_key: get("MORALIS_API_KEY"),
            scraper_api_url: string_or("SCRAPER_API_URL", DEFAULT_SCRAPER_API_URL),
            scraper_api_key: get("SCRAPER_API_KEY"),
            nitter_mirrors,
            max_concurrent_scrapes: parse_or(
                "MAX_CONCURRENT_SCRAPES",
                get("MAX_CONCURRENT_SCRAPES"),
                MAX_CONCURRENT_SCRAPES,
            )
            .max(1),
            provider_timeout: Duration::from_secs(parse_or(
                "PROVIDER_TIMEOUT_SECS",
                get("PROVIDER_TIMEOUT_SECS"),
                PROVIDER_TIMEOUT_SECS,
            )),
            scrape_timeout: Duration::from_secs(parse_or(
                "SCRAPE_TIMEOUT_SECS",
                get("SCRAPE_TIMEOUT_SECS"),
                SCRAPE_TIMEOUT_SECS,
            )),
            narrative_api_url: get("NARRATIVE_API_URL"),
            narrative_api_key: get("NARRATIVE_API_KEY"),
            cache_ttl_secs: parse_or("SCAN_CACHE_TTL_SECS", get("SCAN_CACHE_TTL_SECS"), DEFAULT_CACHE_TTL_SECS),
            host: string_or("RUSTER_HOST", "0.0.0.0"),
            port,
            score_limits: score_limits(&get),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn score_limits(get: &impl Fn(&str) -> Option<String>) -> ScoreLimits {
    let d = ScoreLimits::default();
    ScoreLimits {
        liquidity_cap_below_usd: parse_or(
            "SCORE_LIQUIDITY_CAP_BELOW_USD",
            get("SCORE_LIQUIDITY_CAP_BELOW_USD"),
            d.liquidity_cap_below_usd,
        ),
        liquidity_cap: parse_or("SCORE_LIQUIDITY_CAP", get("SCORE_LIQUIDITY_CAP"), d.liquidity_cap),
        holders_cap_below: parse_or("SCORE_HOLDERS_CAP_BELOW", get("SCORE_HOLDERS_CAP_BELOW"), d.holders_cap_below),
        holders_cap: parse_or("SCORE_HOLDERS_CAP", get("SCORE_HOLDERS_CAP"), d.holders_cap),
        risk_cap: parse_or("SCORE_RISK_CAP", get("SCORE_RISK_CAP"), d.risk_cap),
        authority_cap: parse_or("SCORE_AUTHORITY_CAP", get("SCORE_AUTHORITY_CAP"), d.authority_cap),
        strong_gate: parse_or("SCORE_STRONG_GATE", get("SCORE_STRONG_GATE"), d.strong_gate),
        strong_required: parse_or("SCORE_STRONG_REQUIRED", get("SCORE_STRONG_REQUIRED"), d.strong_required),
        strong_liquidity_usd: parse_or(
            "SCORE_STRONG_LIQUIDITY_USD",
            get("SCORE_STRONG_LIQUIDITY_USD"),
            d.strong_liquidity_usd,
        ),
        strong_holders: parse_or("SCORE_STRONG_HOLDERS", get("SCORE_STRONG_HOLDERS"), d.strong_holders),
        strong_volume_usd: parse_or("SCORE_STRONG_VOLUME_USD", get("SCORE_STRONG_VOLUME_USD"), d.strong_volume_usd),
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(code = ErrorCode::ConfigInvalidValue.as_str(), "⚠️ {}={:?} is not valid, using default", key, raw);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ScannerConfig {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ScannerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = ScannerConfig::default();
        assert_eq!(c.dexscreener_url, DEFAULT_DEXSCREENER_URL);
        assert_eq!(c.max_concurrent_scrapes, 4);
        assert_eq!(c.provider_timeout, Duration::from_secs(8));
        assert_eq!(c.scrape_timeout, Duration::from_secs(10));
        assert_eq!(c.nitter_mirrors.len(), DEFAULT_NITTER_MIRRORS.len());
        assert!(c.moralis_api_key.is_none());
        assert!(c.solana_das_url.is_none());
        assert_eq!(c.score_limits, ScoreLimits::default());
        assert_eq!(c.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("NITTER_MIRRORS", "https://one.test/, https://two.test ,"),
            ("MAX_CONCURRENT_SCRAPES", "2"),
            ("MORALIS_API_KEY", "secret"),
            ("RUSTER_PORT", "8080"),
            ("SCORE_AUTHORITY_CAP", "25"),
            ("SCORE_STRONG_REQUIRED", "5"),
        ]);
        assert_eq!(c.nitter_mirrors, vec!["https://one.test", "https://two.test"]);
        assert_eq!(c.max_concurrent_scrapes, 2);
        assert_eq!(c.moralis_api_key.as_deref(), Some("secret"));
        assert_eq!(c.port, 8080);
        assert_eq!(c.score_limits.authority_cap, 25.0);
        assert_eq!(c.score_limits.strong_required, 5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let c = config(&[
            ("MAX_CONCURRENT_SCRAPES", "lots"),
            ("PROVIDER_TIMEOUT_SECS", "-1"),
            ("PORT", "http"),
            ("MORALIS_API_KEY", "   "),
            ("SCORE_RISK_CAP", "forty"),
        ]);
        assert_eq!(c.max_concurrent_scrapes, 4);
        assert_eq!(c.provider_timeout, Duration::from_secs(8));
        assert_eq!(c.port, 3000);
        assert!(c.moralis_api_key.is_none());
        assert_eq!(c.score_limits.risk_cap, 40.0);
    }
}
