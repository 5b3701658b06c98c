//! Constants Module - Single Source of Truth
//!
//! Timeouts, limits, default endpoints and placeholder values used across the
//! scanner. Other modules import from here instead of hardcoding.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "RusterScanner/0.1.0";

// ============================================
// TIMEOUTS & LIMITS
// ============================================

/// Per-provider fetch timeout (seconds)
pub const PROVIDER_TIMEOUT_SECS: u64 = 8;

/// Timeout for calls routed through the metered scraping backend (seconds)
pub const SCRAPE_TIMEOUT_SECS: u64 = 10;

/// Hard ceiling on in-flight calls to the scraping backend
pub const MAX_CONCURRENT_SCRAPES: usize = 4;

/// Max tweets kept per feed
pub const TWEET_COLLECTION_CAP: usize = 5;

/// Max tweets passed to the narrative collaborator
pub const NARRATIVE_TWEET_LIMIT: usize = 10;

/// Default scan cache TTL (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

// ============================================
// CHAIN CONVENTIONS
// ============================================

/// SPL token default decimals
pub const SOLANA_NATIVE_DECIMALS: u8 = 9;

/// BEP-20 default decimals
pub const BSC_NATIVE_DECIMALS: u8 = 18;

/// Hex digits after the `0x` prefix of an EVM address
pub const EVM_ADDRESS_HEX_LEN: usize = 40;

/// Accepted length range for a base58 Solana address
pub const SOLANA_ADDRESS_MIN_LEN: usize = 32;
pub const SOLANA_ADDRESS_MAX_LEN: usize = 44;

// ============================================
// DEFAULT ENDPOINTS
// ============================================

pub const DEFAULT_DEXSCREENER_URL: &str = "https://api.dexscreener.com/latest/dex";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_BSC_RPC_URL: &str = "https://bsc-dataseed.bnbchain.org";
pub const DEFAULT_RUGCHECK_URL: &str = "https://api.rugcheck.xyz/v1";
pub const DEFAULT_MORALIS_EVM_URL: &str = "https://deep-index.moralis.io/api/v2.2";
pub const DEFAULT_MORALIS_SOLANA_URL: &str = "https://solana-gateway.moralis.io";
pub const DEFAULT_SCRAPER_API_URL: &str = "https://api.scraperapi.com";

/// Ordered feed mirrors, tried first to last
pub const DEFAULT_NITTER_MIRRORS: [&str; 3] = [
    "https://nitter.net",
    "https://nitter.poast.org",
    "https://nitter.privacydev.net",
];

// ============================================
// PLACEHOLDERS
// ============================================

pub const PLACEHOLDER_TOKEN_NAME: &str = "Unknown Token";
pub const PLACEHOLDER_TOKEN_SYMBOL: &str = "UNKNOWN";

/// Text used when the narrative collaborator fails
pub const NARRATIVE_UNAVAILABLE: &str = "Analysis unavailable at this time.";
