//! Scan orchestration
//!
//! classify -> provider fan-out -> reconcile -> social feeds -> sentiment ->
//! token score -> narrative -> fire-and-forget save.
//!
//! The fan-out awaits every provider before looking at any outcome, so a
//! failing market-data call never cancels the enrichment fetches.

use std::sync::Arc;
use std::time::Instant;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::reconciler::{reconcile, ProviderOutputs};
use super::sentiment;
use super::token_score::TokenScorer;
use crate::collaborators::{HttpNarrativeClient, NarrativeContext, NarrativeGenerator, ScanStore};
use crate::config::ScannerConfig;
use crate::models::{
    AppResult, ErrorCode, EventSink, MarketQuote, NarrativeText, ProviderResult, ScanEvent, ScanResult,
    SecurityReport, TokenAddress, TokenSnapshot, TweetCollection,
};
use crate::providers::{fetch_isolated, fetch_primary, ProviderRegistry};
use crate::social::{FeedQuery, MirrorFallbackFetcher, ScrapeAdmissionController, ScrapeClient};
use crate::utils::constants::PLACEHOLDER_TOKEN_SYMBOL;
use crate::utils::telemetry::TelemetryCollector;

pub struct Scanner {
    providers: ProviderRegistry,
    feeds: MirrorFallbackFetcher,
    scorer: TokenScorer,
    narrative: Option<Arc<dyn NarrativeGenerator>>,
    store: Option<Arc<dyn ScanStore>>,
    telemetry: Arc<TelemetryCollector>,
}

impl Scanner {
    pub fn new(providers: ProviderRegistry, feeds: MirrorFallbackFetcher, scorer: TokenScorer) -> Self {
        Self {
            providers,
            feeds,
            scorer,
            narrative: None,
            store: None,
            telemetry: Arc::new(TelemetryCollector::new()),
        }
    }

    /// Live scanner wired from configuration. The store is attached by the caller.
    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        let providers = ProviderRegistry::from_config(config)?;

        let page_source = ScrapeClient::new(&config.scraper_api_url, config.scraper_api_key.clone())?;
        if page_source.is_metered() {
            info!(
                "🕸️ Feed pages proxied through scraping backend (max {} in flight)",
                config.max_concurrent_scrapes
            );
        }
        let feeds = MirrorFallbackFetcher::new(
            config.nitter_mirrors.clone(),
            Arc::new(page_source),
            ScrapeAdmissionController::new(config.max_concurrent_scrapes),
        )
        .with_timeout(config.scrape_timeout);

        let mut scanner = Self::new(providers, feeds, TokenScorer::new(config.score_limits.clone()));
        if let Some(url) = &config.narrative_api_url {
            let client = HttpNarrativeClient::new(url, config.narrative_api_key.clone(), config.scrape_timeout)?;
            scanner = scanner.with_narrative(Arc::new(client));
        }
        Ok(scanner)
    }

    pub fn with_narrative(mut self, narrative: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ScanStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<TelemetryCollector>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        &self.telemetry
    }

    pub fn scrape_gate(&self) -> &ScrapeAdmissionController {
        self.feeds.gate()
    }

    pub async fn scan(&self, raw_address: &str) -> AppResult<ScanResult> {
        self.scan_with_events(raw_address, None).await
    }

    /// Run one scan, emitting intermediate artifacts on `events` as each stage completes
    pub async fn scan_with_events(
        &self,
        raw_address: &str,
        events: Option<mpsc::UnboundedSender<ScanEvent>>,
    ) -> AppResult<ScanResult> {
        let address = TokenAddress::parse(raw_address)?;
        let sink = EventSink::new(Uuid::new_v4(), events);
        let start = Instant::now();
        info!("🔍 Scan {} started: {} ({})", sink.scan_id(), address, address.chain().name());

        let snapshot = match self.collect(&address, &sink).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.telemetry.record_failure();
                warn!(code = e.code_str(), "❌ Scan {} failed: {}", sink.scan_id(), e);
                return Err(e);
            }
        };

        let snapshot = self.attach_social(snapshot).await;

        let sentiment_score = sentiment::score_snapshot(&snapshot);
        sink.emit(ScanEvent::SentimentReady {
            scan_id: sink.scan_id(),
            sentiment_score,
        });

        let breakdown = self.scorer.breakdown(&snapshot, sentiment_score);
        debug!(
            "📐 Score {}: raw {:.1}, caps {:?}, {} strong indicators{}",
            breakdown.total,
            breakdown.raw_sum,
            breakdown.caps_applied,
            breakdown.strong_indicators,
            if breakdown.gated { ", gated" } else { "" }
        );
        let snapshot = snapshot.with_scores(sentiment_score, breakdown.total);
        sink.emit(ScanEvent::ScoreReady {
            scan_id: sink.scan_id(),
            token_score: breakdown.total,
        });

        let text = self.narrate(&snapshot).await;
        let result = ScanResult::from_snapshot(sink.scan_id(), &snapshot, text);
        self.save_in_background(&address, &result);

        let latency_ms = start.elapsed().as_millis() as u64;
        self.telemetry.record_scan(address.chain(), breakdown.total, latency_ms);
        info!(
            "✅ Scan {} done in {}ms: {} score={} sentiment={:?}",
            sink.scan_id(),
            latency_ms,
            result.symbol,
            result.token_score,
            result.sentiment_score
        );
        Ok(result)
    }

    /// Provider fan-out and reconciliation
    async fn collect(&self, address: &TokenAddress, sink: &EventSink) -> AppResult<TokenSnapshot> {
        let timeout = self.providers.timeout();
        let chain = self.providers.for_chain(address.chain());

        let (market, fundamentals, security, holders) = tokio::join!(
            self.fetch_market(address, sink),
            fetch_isolated(chain.fundamentals(), address, timeout),
            self.fetch_security(address, sink),
            fetch_isolated(&self.providers.holders, address, timeout),
        );

        let market = market?;
        let absent = [
            !fundamentals.is_present(),
            security.as_ref().is_some_and(|s| !s.is_present()),
            !holders.is_present(),
        ]
        .iter()
        .filter(|a| **a)
        .count();
        if absent > 0 {
            self.telemetry.record_absent_enrichments(absent as u64);
        }

        Ok(reconcile(
            address.clone(),
            ProviderOutputs {
                market,
                fundamentals,
                security,
                holders,
            },
        ))
    }

    async fn fetch_market(
        &self,
        address: &TokenAddress,
        sink: &EventSink,
    ) -> AppResult<ProviderResult<MarketQuote>> {
        let result = fetch_primary(&self.providers.market, address, self.providers.timeout()).await;
        if let Ok(r) = &result {
            sink.emit(ScanEvent::MarketDataReady {
                scan_id: sink.scan_id(),
                market: r.value.as_ref().map(|q| q.market.clone()).unwrap_or_default(),
            });
        }
        result
    }

    /// `None` when the chain has no security provider
    async fn fetch_security(
        &self,
        address: &TokenAddress,
        sink: &EventSink,
    ) -> Option<ProviderResult<SecurityReport>> {
        let result = match self.providers.for_chain(address.chain()).security() {
            Some(provider) => Some(fetch_isolated(provider, address, self.providers.timeout()).await),
            None => None,
        };
        sink.emit(ScanEvent::SecurityReady {
            scan_id: sink.scan_id(),
            security: result.as_ref().and_then(|r| r.value.clone()),
        });
        result
    }

    /// Profile timeline and ticker search, fetched concurrently and kept separate
    async fn attach_social(&self, snapshot: TokenSnapshot) -> TokenSnapshot {
        let handle = snapshot.socials.x_handle();
        let symbol = Some(snapshot.symbol.clone()).filter(|s| s != PLACEHOLDER_TOKEN_SYMBOL);

        let (twitter, ticker) = tokio::join!(
            self.fetch_feed(handle.map(FeedQuery::profile)),
            self.fetch_feed(symbol.map(FeedQuery::ticker)),
        );
        snapshot.with_social(twitter, ticker)
    }

    async fn fetch_feed(&self, query: Option<FeedQuery>) -> TweetCollection {
        let Some(query) = query else {
            return TweetCollection::no_data();
        };
        let collection = self.feeds.fetch(&query).await;
        if collection.source.is_none() {
            self.telemetry.record_scrape_exhausted();
        }
        collection
    }

    async fn narrate(&self, snapshot: &TokenSnapshot) -> NarrativeText {
        let Some(generator) = &self.narrative else {
            return NarrativeText::placeholder();
        };
        let context = NarrativeContext::from_snapshot(snapshot);
        match generator.generate(&context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(code = ErrorCode::CollaboratorFailed.as_str(), "⚠️ Narrative generation failed: {}", e);
                self.telemetry.record_narrative_fallback();
                NarrativeText::placeholder()
            }
        }
    }

    fn save_in_background(&self, address: &TokenAddress, result: &ScanResult) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let key = address.to_string();
        let result = result.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&key, &result).await {
                warn!(code = ErrorCode::CollaboratorFailed.as_str(), "⚠️ Failed to save scan for {}: {}", key, e);
            }
        });
    }
}
