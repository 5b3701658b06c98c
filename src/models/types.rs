//! Core data types for token scans

use alloy_primitives::U256;
use serde::{Deserialize, Serialize, Serializer};

use crate::utils::constants::{BSC_NATIVE_DECIMALS, SOLANA_NATIVE_DECIMALS, TWEET_COLLECTION_CAP};

/// Blockchain family, determined purely from address syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    Solana,
    BnbChain,
}

impl ChainFamily {
    /// Human-readable chain name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Solana => "Solana",
            Self::BnbChain => "BNB Chain",
        }
    }

    /// DexScreener chain identifier
    pub fn dexscreener_id(&self) -> &'static str {
        match self {
            Self::Solana => "solana",
            Self::BnbChain => "bsc",
        }
    }

    /// Decimals used when the fundamentals provider omits them
    pub fn default_decimals(&self) -> u8 {
        match self {
            Self::Solana => SOLANA_NATIVE_DECIMALS,
            Self::BnbChain => BSC_NATIVE_DECIMALS,
        }
    }
}

/// Contract address that passed classification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenAddress {
    raw: String,
    chain: ChainFamily,
}

impl TokenAddress {
    /// Only the classifier builds addresses, so the chain tag is always trustworthy
    pub(crate) fn new(raw: impl Into<String>, chain: ChainFamily) -> Self {
        Self {
            raw: raw.into(),
            chain,
        }
    }

    /// Classify and wrap a raw address string
    pub fn parse(raw: &str) -> crate::models::AppResult<Self> {
        crate::core::classifier::classify(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn chain(&self) -> ChainFamily {
        self.chain
    }
}

impl std::fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// External data source identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    DexScreener,
    SolanaRpc,
    BscRpc,
    RugCheck,
    Moralis,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DexScreener => "dexscreener",
            Self::SolanaRpc => "solana_rpc",
            Self::BscRpc => "bsc_rpc",
            Self::RugCheck => "rugcheck",
            Self::Moralis => "moralis",
        }
    }
}

/// Outcome of one fetcher. Failures are folded into `value: None`.
#[derive(Debug, Clone)]
pub struct ProviderResult<T> {
    pub value: Option<T>,
    pub source: ProviderId,
}

impl<T> ProviderResult<T> {
    pub fn present(source: ProviderId, value: T) -> Self {
        Self {
            value: Some(value),
            source,
        }
    }

    pub fn absent(source: ProviderId) -> Self {
        Self {
            value: None,
            source,
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

// ============================================
// Market data
// ============================================

/// Market figures; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub volume_24h: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub dex_url: Option<String>,
    pub market_cap: Option<f64>,
}

impl MarketData {
    /// Number of present price/volume fields, used to pick the richer source
    pub fn richness(&self) -> usize {
        [self.price_usd, self.volume_24h, self.price_change_24h]
            .iter()
            .filter(|v| v.is_some())
            .count()
    }

    /// True when there is something to derive momentum or volume from
    pub fn has_signal(&self) -> bool {
        self.price_change_24h.is_some() || self.volume_24h.is_some()
    }
}

/// Market-data provider output: figures plus listing metadata
#[derive(Debug, Clone, Default)]
pub struct MarketQuote {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub market: MarketData,
    pub socials: SocialLinks,
}

// ============================================
// Fundamentals
// ============================================

/// On-chain token fundamentals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(skip)]
    pub name: Option<String>,
    #[serde(skip)]
    pub symbol: Option<String>,
    /// Raw integer supply (base units)
    #[serde(serialize_with = "serialize_u256_decimal")]
    pub supply: Option<U256>,
    pub decimals: Option<u8>,
    /// Solana only; `None` when the mint account was not read
    #[serde(flatten)]
    pub authorities: Option<MintAuthorities>,
    pub holder_count: Option<u64>,
    /// Secondary price quote, if the fundamentals source has one
    #[serde(skip)]
    pub price_usd: Option<f64>,
    /// Secondary social links used to backfill the market listing
    #[serde(skip)]
    pub socials: SocialLinks,
}

/// Mint and freeze authority as read from the mint account. `None` means revoked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintAuthorities {
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

fn serialize_u256_decimal<S: Serializer>(value: &Option<U256>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_str(&v.to_string()),
        None => s.serialize_none(),
    }
}

// ============================================
// Security
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityRisk {
    pub level: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub risk_level: Option<String>,
    pub risks: Vec<SecurityRisk>,
    pub score: Option<f64>,
}

impl SecurityReport {
    pub fn count(&self, level: RiskLevel) -> usize {
        self.risks.iter().filter(|r| r.level == level).count()
    }

    pub fn is_clean(&self) -> bool {
        self.risks.is_empty()
    }
}

/// Whether security data exists, and why not when it doesn't
#[derive(Debug, Clone, PartialEq)]
pub enum SecurityCoverage {
    /// The chain has no security provider at all
    Unsupported,
    /// A provider exists but returned nothing
    Unavailable,
    Report(SecurityReport),
}

impl SecurityCoverage {
    pub fn report(&self) -> Option<&SecurityReport> {
        match self {
            Self::Report(r) => Some(r),
            _ => None,
        }
    }
}

// ============================================
// Socials
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    pub website: Option<String>,
    #[serde(rename = "twitter")]
    pub x: Option<String>,
    pub telegram: Option<String>,
}

impl SocialLinks {
    pub fn count(&self) -> usize {
        [&self.website, &self.x, &self.telegram]
            .iter()
            .filter(|l| l.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Fill only the links this set is missing
    pub fn backfill(mut self, other: &SocialLinks) -> Self {
        if self.website.is_none() {
            self.website = other.website.clone();
        }
        if self.x.is_none() {
            self.x = other.x.clone();
        }
        if self.telegram.is_none() {
            self.telegram = other.telegram.clone();
        }
        self
    }

    /// Account handle from an x.com / twitter.com profile link
    pub fn x_handle(&self) -> Option<String> {
        let url = self.x.as_deref()?;
        let path = url
            .trim_end_matches('/')
            .split("x.com/")
            .nth(1)
            .or_else(|| url.split("twitter.com/").nth(1))?;
        let handle = path
            .split(['/', '?', '#'])
            .next()?
            .trim_start_matches('@');
        let valid = !handle.is_empty()
            && handle.len() <= 15
            && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| handle.to_string())
    }
}

// ============================================
// Tweets
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tweet {
    pub text: String,
    pub author: String,
    pub date: String,
    pub likes: u64,
    pub retweets: u64,
    pub url: String,
}

impl Tweet {
    /// likes + 2 x retweets, saturating
    pub fn engagement(&self) -> u64 {
        self.likes.saturating_add(self.retweets.saturating_mul(2))
    }
}

/// Bounded tweet list from one logical feed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TweetCollection {
    pub tweets: Vec<Tweet>,
    /// Mirror that served the items; `None` means "no data"
    pub source: Option<String>,
}

impl TweetCollection {
    pub fn new(mut tweets: Vec<Tweet>, source: impl Into<String>) -> Self {
        tweets.truncate(TWEET_COLLECTION_CAP);
        Self {
            tweets,
            source: Some(source.into()),
        }
    }

    pub fn no_data() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }
}

// ============================================
// Snapshot
// ============================================

/// Reconciled view of one token. Built once per scan; scoring returns a new copy.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSnapshot {
    pub address: TokenAddress,
    pub name: String,
    pub symbol: String,
    pub market: MarketData,
    /// Price quote from the fundamentals source, if any
    pub secondary_market: Option<MarketData>,
    pub fundamentals: Option<Fundamentals>,
    pub holder_count: Option<u64>,
    pub decimals: u8,
    pub security: SecurityCoverage,
    pub socials: SocialLinks,
    pub twitter: TweetCollection,
    pub ticker_tweets: TweetCollection,
    pub sentiment_score: Option<u8>,
    pub token_score: Option<u8>,
}

impl TokenSnapshot {
    pub fn chain(&self) -> ChainFamily {
        self.address.chain()
    }

    /// Solana mint/freeze authority presence, known only when the mint account was read
    pub fn authorities(&self) -> Option<(bool, bool)> {
        if self.chain() != ChainFamily::Solana {
            return None;
        }
        self.fundamentals
            .as_ref()
            .and_then(|f| f.authorities.as_ref())
            .map(|a| (a.mint_authority.is_some(), a.freeze_authority.is_some()))
    }

    /// Both feeds together; they are only ever merged for scoring
    pub fn all_tweets(&self) -> impl Iterator<Item = &Tweet> {
        self.twitter.tweets.iter().chain(self.ticker_tweets.tweets.iter())
    }

    pub fn with_social(self, twitter: TweetCollection, ticker_tweets: TweetCollection) -> Self {
        Self {
            twitter,
            ticker_tweets,
            ..self
        }
    }

    pub fn with_scores(self, sentiment_score: Option<u8>, token_score: u8) -> Self {
        Self {
            sentiment_score,
            token_score: Some(token_score),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_handle_extraction() {
        let links = SocialLinks {
            x: Some("https://x.com/solana".to_string()),
            ..Default::default()
        };
        assert_eq!(links.x_handle().as_deref(), Some("solana"));

        let links = SocialLinks {
            x: Some("https://twitter.com/@bnbchain/status/1?s=20".to_string()),
            ..Default::default()
        };
        assert_eq!(links.x_handle().as_deref(), Some("bnbchain"));

        let links = SocialLinks {
            x: Some("https://x.com/".to_string()),
            ..Default::default()
        };
        assert!(links.x_handle().is_none());
    }

    #[test]
    fn test_backfill_keeps_primary_links() {
        let primary = SocialLinks {
            website: Some("https://primary.io".to_string()),
            ..Default::default()
        };
        let secondary = SocialLinks {
            website: Some("https://other.io".to_string()),
            telegram: Some("https://t.me/other".to_string()),
            ..Default::default()
        };
        let merged = primary.backfill(&secondary);
        assert_eq!(merged.website.as_deref(), Some("https://primary.io"));
        assert_eq!(merged.telegram.as_deref(), Some("https://t.me/other"));
        assert_eq!(merged.count(), 2);
    }

    #[test]
    fn test_tweet_collection_is_capped() {
        let tweet = Tweet {
            text: "gm".to_string(),
            author: "a".to_string(),
            date: String::new(),
            likes: 1,
            retweets: 0,
            url: String::new(),
        };
        let collection = TweetCollection::new(vec![tweet; 9], "https://mirror");
        assert_eq!(collection.len(), TWEET_COLLECTION_CAP);
        assert!(TweetCollection::no_data().source.is_none());
    }

    #[test]
    fn test_engagement_saturates() {
        let tweet = Tweet {
            text: "$BIG".to_string(),
            author: "a".to_string(),
            date: String::new(),
            likes: u64::MAX,
            retweets: u64::MAX,
            url: String::new(),
        };
        assert_eq!(tweet.engagement(), u64::MAX);
    }

    #[test]
    fn test_market_richness() {
        let market = MarketData {
            price_usd: Some(1.0),
            volume_24h: Some(10.0),
            ..Default::default()
        };
        assert_eq!(market.richness(), 2);
        assert!(market.has_signal());
        assert!(!MarketData::default().has_signal());
    }
}
