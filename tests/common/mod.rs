//! In-memory fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use eyre::{eyre, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ruster_scanner::models::*;
use ruster_scanner::providers::{ChainProviders, Provider, ProviderRegistry};
use ruster_scanner::social::{MirrorFallbackFetcher, PageSource, ScrapeAdmissionController};
use ruster_scanner::{NarrativeContext, NarrativeGenerator, ScanStore, Scanner, TokenScorer};

pub const SOL: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const BNB: &str = "0x2170Ed0880ac9A755fd29B2688956BD959F933F8";

// ============================================
// Providers
// ============================================

pub struct StaticProvider<T> {
    id: ProviderId,
    value: Option<T>,
    fail: bool,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl<T> StaticProvider<T> {
    pub fn returning(id: ProviderId, value: Option<T>) -> Self {
        Self {
            id,
            value,
            fail: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(id: ProviderId) -> Self {
        Self {
            fail: true,
            ..Self::returning(id, None)
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> Provider for StaticProvider<T> {
    type Output = T;

    fn id(&self) -> ProviderId {
        self.id
    }

    async fn fetch(&self, _: &TokenAddress) -> Result<Option<T>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(eyre!("HTTP error: 503 Service Unavailable"));
        }
        Ok(self.value.clone())
    }
}

pub fn bonk_quote() -> MarketQuote {
    MarketQuote {
        name: Some("Bonk".to_string()),
        symbol: Some("BONK".to_string()),
        market: MarketData {
            price_usd: Some(0.000021),
            liquidity_usd: Some(3_500_000.0),
            volume_24h: Some(12_000_000.0),
            price_change_24h: Some(6.2),
            dex_url: Some("https://dexscreener.com/solana/pair".to_string()),
            market_cap: Some(1_400_000_000.0),
        },
        socials: SocialLinks {
            website: Some("https://bonkcoin.com".to_string()),
            x: Some("https://x.com/bonk_inu".to_string()),
            telegram: Some("https://t.me/bonk".to_string()),
        },
    }
}

pub fn renounced_mint() -> Fundamentals {
    Fundamentals {
        decimals: Some(5),
        authorities: Some(MintAuthorities::default()),
        ..Default::default()
    }
}

/// Provider set for a scan; replace fields before calling [`Providers::registry`]
pub struct Providers {
    pub market: Arc<StaticProvider<MarketQuote>>,
    pub solana_fundamentals: Arc<StaticProvider<Fundamentals>>,
    pub security: Arc<StaticProvider<SecurityReport>>,
    pub bsc_fundamentals: Arc<StaticProvider<Fundamentals>>,
    pub holders: Arc<StaticProvider<u64>>,
    pub timeout: Duration,
}

impl Default for Providers {
    fn default() -> Self {
        Self {
            market: Arc::new(StaticProvider::returning(ProviderId::DexScreener, Some(bonk_quote()))),
            solana_fundamentals: Arc::new(StaticProvider::returning(ProviderId::SolanaRpc, Some(renounced_mint()))),
            security: Arc::new(StaticProvider::returning(ProviderId::RugCheck, Some(SecurityReport::default()))),
            bsc_fundamentals: Arc::new(StaticProvider::returning(ProviderId::BscRpc, None)),
            holders: Arc::new(StaticProvider::returning(ProviderId::Moralis, Some(42_000))),
            timeout: Duration::from_millis(300),
        }
    }
}

impl Providers {
    pub fn registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(
            self.market.clone(),
            self.holders.clone(),
            ChainProviders::Solana {
                fundamentals: self.solana_fundamentals.clone(),
                security: self.security.clone(),
            },
            ChainProviders::BnbChain {
                fundamentals: self.bsc_fundamentals.clone(),
            },
        )
        .with_timeout(self.timeout)
    }
}

// ============================================
// Feed mirrors
// ============================================

/// One feed item: (author, text, retweets, likes)
pub type Item<'a> = (&'a str, &'a str, u64, u64);

pub fn timeline_page(items: &[Item]) -> String {
    let mut page = String::from("<html><body><div class=\"timeline\">");
    for (i, (author, text, retweets, likes)) in items.iter().enumerate() {
        page.push_str(&format!(
            r#"<div class="timeline-item " data-username="{author}">
<a class="tweet-link" href="/{author}/status/{i}#m"></a>
<a class="username" href="/{author}" title="@{author}">@{author}</a>
<span class="tweet-date"><a href="/{author}/status/{i}#m" title="Mar 9, 2025 · 1:00 PM UTC">1h</a></span>
<div class="tweet-content media-body" dir="auto">{text}</div>
<span class="icon-retweet" title=""></span> {retweets}
<span class="icon-heart" title=""></span> {likes}
</div>"#
        ));
    }
    page.push_str("</div></body></html>");
    page
}

pub fn rate_limited_page() -> String {
    "<html><body>Instance has been rate limited.</body></html>".to_string()
}

/// Serves canned bodies keyed by URL prefix and records every request
#[derive(Default)]
pub struct ScriptedPages {
    routes: Vec<(String, std::result::Result<String, String>)>,
    delay: Option<Duration>,
    pub requests: Mutex<Vec<String>>,
}

impl ScriptedPages {
    pub fn serve(mut self, url_prefix: &str, body: String) -> Self {
        self.routes.push((url_prefix.to_string(), Ok(body)));
        self
    }

    pub fn fail(mut self, url_prefix: &str) -> Self {
        self.routes.push((url_prefix.to_string(), Err("connection reset".to_string())));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for ScriptedPages {
    async fn get_page(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.routes.iter().find(|(prefix, _)| url.starts_with(prefix.as_str())) {
            Some((_, Ok(body))) => Ok(body.clone()),
            Some((_, Err(e))) => Err(eyre!("{}", e)),
            None => Err(eyre!("HTTP error: 404")),
        }
    }
}

pub fn bonk_pages(mirror: &str) -> ScriptedPages {
    ScriptedPages::default()
        .serve(
            &format!("{}/search", mirror),
            timeline_page(&[
                ("whale", "loading more $BONK here", 12, 150),
                ("bot", "unrelated spam", 0, 0),
            ]),
        )
        .serve(
            &format!("{}/bonk_inu", mirror),
            timeline_page(&[("bonk_inu", "BONK burn complete", 300, 2_400)]),
        )
}

pub fn feeds(mirrors: &[&str], pages: Arc<ScriptedPages>, limit: usize) -> MirrorFallbackFetcher {
    MirrorFallbackFetcher::new(
        mirrors.iter().map(|m| m.to_string()).collect(),
        pages,
        ScrapeAdmissionController::new(limit),
    )
    .with_timeout(Duration::from_millis(500))
}

pub fn scanner(providers: &Providers, feeds: MirrorFallbackFetcher) -> Scanner {
    Scanner::new(providers.registry(), feeds, TokenScorer::default())
}

// ============================================
// Collaborators
// ============================================

pub struct CannedNarrative;

#[async_trait]
impl NarrativeGenerator for CannedNarrative {
    async fn generate(&self, context: &NarrativeContext) -> Result<NarrativeText> {
        Ok(NarrativeText {
            narrative: format!("{} has {} recent posts", context.symbol, context.tweets.len()),
            verdict: "watch".to_string(),
            summary: format!("score {:?}", context.token_score),
        })
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub saved: Mutex<Vec<(String, ScanResult)>>,
    pub fail: bool,
}

#[async_trait]
impl ScanStore for RecordingStore {
    async fn save(&self, address: &str, result: &ScanResult) -> Result<()> {
        if self.fail {
            return Err(eyre!("store offline"));
        }
        self.saved.lock().unwrap().push((address.to_string(), result.clone()));
        Ok(())
    }
}
