//! DexScreener API Client - market data provider
//!
//! The one provider whose failure fails the scan. A token usually trades in
//! several pools; the pool with the highest USD liquidity is the listing we
//! report, ties going to the pair DexScreener returned first.
//!
//! API: https://api.dexscreener.com/latest/dex/tokens/{tokenAddress}
//! Free, no API key required

use std::time::Duration;

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::{debug, info};

use super::provider::Provider;
use crate::models::{MarketData, MarketQuote, ProviderId, SocialLinks, TokenAddress};
use crate::utils::constants::{PROVIDER_TIMEOUT_SECS, USER_AGENT};

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    /// Chain ID ("solana", "bsc", ...)
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pair_address: String,
    pub base_token: DexToken,
    pub price_usd: Option<String>,
    pub liquidity: Option<DexLiquidity>,
    pub volume: Option<DexWindow>,
    pub price_change: Option<DexWindow>,
    pub market_cap: Option<f64>,
    pub fdv: Option<f64>,
    pub info: Option<DexInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexToken {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

/// Rolling-window figures; only the 24h window is used
#[derive(Debug, Clone, Deserialize)]
pub struct DexWindow {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DexInfo {
    #[serde(default)]
    pub websites: Vec<DexWebsite>,
    #[serde(default)]
    pub socials: Vec<DexSocial>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexWebsite {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DexSocial {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl DexPair {
    pub fn liquidity_usd(&self) -> Option<f64> {
        self.liquidity.as_ref().and_then(|l| l.usd)
    }

    fn market_data(&self) -> MarketData {
        MarketData {
            price_usd: self.price_usd.as_deref().and_then(|p| p.parse::<f64>().ok()),
            liquidity_usd: self.liquidity_usd(),
            volume_24h: self.volume.as_ref().and_then(|v| v.h24),
            price_change_24h: self.price_change.as_ref().and_then(|c| c.h24),
            dex_url: self.url.clone(),
            market_cap: self.market_cap.or(self.fdv),
        }
    }

    fn social_links(&self) -> SocialLinks {
        let Some(info) = &self.info else {
            return SocialLinks::default();
        };
        let social = |kind: &str| {
            info.socials
                .iter()
                .find(|s| s.kind.eq_ignore_ascii_case(kind))
                .map(|s| s.url.clone())
        };
        SocialLinks {
            website: info.websites.first().map(|w| w.url.clone()),
            x: social("twitter").or_else(|| social("x")),
            telegram: social("telegram"),
        }
    }

    pub fn to_quote(&self) -> MarketQuote {
        MarketQuote {
            name: self.base_token.name.clone().filter(|n| !n.is_empty()),
            symbol: self.base_token.symbol.clone().filter(|s| !s.is_empty()),
            market: self.market_data(),
            socials: self.social_links(),
        }
    }
}

/// Highest-liquidity pair on `chain_id`; ties keep the first-seen pair.
/// Pairs where the token is the base side are preferred over quote-side pools.
pub fn select_best_pair<'a>(pairs: &'a [DexPair], chain_id: &str, token: &str) -> Option<&'a DexPair> {
    let on_chain: Vec<&DexPair> = pairs
        .iter()
        .filter(|p| p.chain_id.eq_ignore_ascii_case(chain_id))
        .collect();
    let as_base: Vec<&DexPair> = on_chain
        .iter()
        .copied()
        .filter(|p| p.base_token.address.eq_ignore_ascii_case(token))
        .collect();
    let candidates = if as_base.is_empty() { on_chain } else { as_base };

    let mut best: Option<&DexPair> = None;
    for pair in candidates {
        let liq = pair.liquidity_usd().unwrap_or(0.0);
        match best {
            // Strictly greater: an equal later pair never displaces the earlier one
            Some(current) if liq <= current.liquidity_usd().unwrap_or(0.0) => {}
            _ => best = Some(pair),
        }
    }
    best
}

/// DexScreener API client
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build DexScreener client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all pairs for a token address, in API order
    pub async fn get_token_pairs(&self, token_address: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);
        debug!("🔍 DexScreener: Fetching pairs for {}", token_address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre!("DexScreener request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("DexScreener API error: {}", response.status()));
        }

        let data: DexScreenerResponse = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse DexScreener response: {}", e))?;

        Ok(data.pairs.unwrap_or_default())
    }
}

#[async_trait]
impl Provider for DexScreenerClient {
    type Output = MarketQuote;

    fn id(&self) -> ProviderId {
        ProviderId::DexScreener
    }

    async fn fetch(&self, address: &TokenAddress) -> Result<Option<MarketQuote>> {
        let pairs = self.get_token_pairs(address.as_str()).await?;
        let chain_id = address.chain().dexscreener_id();

        let Some(best) = select_best_pair(&pairs, chain_id, address.as_str()) else {
            info!("📭 DexScreener: no {} pairs for {}", chain_id, address);
            return Ok(None);
        };

        info!(
            "📊 DexScreener: {} pairs, best {} on {} (${:.0} liquidity)",
            pairs.len(),
            best.pair_address,
            best.dex_id,
            best.liquidity_usd().unwrap_or(0.0)
        );
        Ok(Some(best.to_quote()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x2170Ed0880ac9A755fd29B2688956BD959F933F8";

    fn pairs_json() -> &'static str {
        r#"{"pairs":[
            {"chainId":"bsc","dexId":"biswap","pairAddress":"P1","url":"https://dexscreener.com/bsc/p1",
             "baseToken":{"address":"0x2170ed0880ac9a755fd29b2688956bd959f933f8","name":"Ethereum Token","symbol":"ETH"},
             "priceUsd":"3120.55","liquidity":{"usd":500000.0},"volume":{"h24":1000.0}},
            {"chainId":"ethereum","dexId":"uniswap","pairAddress":"P2",
             "baseToken":{"address":"0x2170Ed0880ac9A755fd29B2688956BD959F933F8","name":"X","symbol":"X"},
             "liquidity":{"usd":9000000.0}},
            {"chainId":"bsc","dexId":"pancakeswap","pairAddress":"P3","url":"https://dexscreener.com/bsc/p3",
             "baseToken":{"address":"0x2170Ed0880ac9A755fd29B2688956BD959F933F8","name":"Ethereum Token","symbol":"ETH"},
             "priceUsd":"3121.00","liquidity":{"usd":2000000.0},"volume":{"h24":250000.0},
             "priceChange":{"h24":-2.5},"marketCap":123456789.0,
             "info":{"websites":[{"label":"Website","url":"https://ethereum.org"}],
                     "socials":[{"type":"twitter","url":"https://x.com/ethereum"},{"type":"telegram","url":"https://t.me/eth"}]}},
            {"chainId":"bsc","dexId":"apeswap","pairAddress":"P4",
             "baseToken":{"address":"0x2170Ed0880ac9A755fd29B2688956BD959F933F8"},
             "liquidity":{"usd":2000000.0}}
        ]}"#
    }

    #[test]
    fn test_highest_liquidity_first_seen_wins() {
        let data: DexScreenerResponse = serde_json::from_str(pairs_json()).unwrap();
        let pairs = data.pairs.unwrap();
        let best = select_best_pair(&pairs, "bsc", TOKEN).unwrap();
        assert_eq!(best.pair_address, "P3");
    }

    #[test]
    fn test_quote_mapping() {
        let data: DexScreenerResponse = serde_json::from_str(pairs_json()).unwrap();
        let pairs = data.pairs.unwrap();
        let quote = select_best_pair(&pairs, "bsc", TOKEN).unwrap().to_quote();

        assert_eq!(quote.symbol.as_deref(), Some("ETH"));
        assert_eq!(quote.market.price_usd, Some(3121.0));
        assert_eq!(quote.market.liquidity_usd, Some(2_000_000.0));
        assert_eq!(quote.market.price_change_24h, Some(-2.5));
        assert_eq!(quote.market.market_cap, Some(123_456_789.0));
        assert_eq!(quote.socials.website.as_deref(), Some("https://ethereum.org"));
        assert_eq!(quote.socials.x.as_deref(), Some("https://x.com/ethereum"));
        assert_eq!(quote.socials.count(), 3);
    }

    #[test]
    fn test_no_pairs_on_chain() {
        let data: DexScreenerResponse = serde_json::from_str(pairs_json()).unwrap();
        let pairs = data.pairs.unwrap();
        assert!(select_best_pair(&pairs, "solana", TOKEN).is_none());
        assert!(select_best_pair(&[], "bsc", TOKEN).is_none());
    }
}
