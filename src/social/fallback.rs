//! Ordered mirror fallback
//!
//! `try_in_order` is the generic combinator: candidates run lazily, one at a
//! time, and the first acceptable value wins. Candidates after the winner are
//! never started. `MirrorFallbackFetcher` applies it to feed mirrors, gating
//! every page request through the shared admission controller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, info, warn};

use super::admission::ScrapeAdmissionController;
use super::feed::{has_timeline_structure, is_rate_limited, parse_timeline, FeedQuery};
use crate::models::{ErrorCode, Tweet, TweetCollection};
use crate::utils::constants::SCRAPE_TIMEOUT_SECS;

/// Anything that can fetch a page body by URL
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get_page(&self, url: &str) -> Result<String>;
}

/// Run `candidates` in order; return the first value passing `is_acceptable`
pub async fn try_in_order<T, I, F, Fut>(candidates: I, is_acceptable: impl Fn(&T) -> bool) -> Option<T>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for candidate in candidates {
        if let Some(value) = candidate().await {
            if is_acceptable(&value) {
                return Some(value);
            }
        }
    }
    None
}

/// Fetches one logical feed from an ordered mirror list
#[derive(Clone)]
pub struct MirrorFallbackFetcher {
    mirrors: Vec<String>,
    source: Arc<dyn PageSource>,
    gate: ScrapeAdmissionController,
    timeout: Duration,
}

impl MirrorFallbackFetcher {
    pub fn new(mirrors: Vec<String>, source: Arc<dyn PageSource>, gate: ScrapeAdmissionController) -> Self {
        Self {
            mirrors,
            source,
            gate,
            timeout: Duration::from_secs(SCRAPE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn gate(&self) -> &ScrapeAdmissionController {
        &self.gate
    }

    /// Never fails: exhausting every mirror yields an empty "no data" collection
    pub async fn fetch(&self, query: &FeedQuery) -> TweetCollection {
        let attempts = self.mirrors.iter().map(|mirror| {
            let url = query.url_for(mirror);
            move || async move {
                let url = url?;
                let body = self.fetch_page(&url).await?;
                self.structured_items(mirror, &body)
                    .map(|items| (mirror.clone(), items))
            }
        }).collect::<Vec<_>>();

        match try_in_order(attempts, |(_, items): &(String, Vec<Tweet>)| !items.is_empty()).await {
            Some((mirror, items)) => {
                let matching: Vec<Tweet> = items.into_iter().filter(|t| query.matches(t)).collect();
                info!(
                    "🐦 {} → {} matching items from {}",
                    query.label(),
                    matching.len(),
                    mirror
                );
                TweetCollection::new(matching, mirror)
            }
            None => {
                warn!(
                    code = ErrorCode::ScrapeExhausted.as_str(),
                    "⚠️ All {} mirrors failed for {}",
                    self.mirrors.len(),
                    query.label()
                );
                TweetCollection::no_data()
            }
        }
    }

    /// One gated request. The slot is held only for the request and is
    /// released on timeout because the guard drops with the cancelled future.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let _slot = self.gate.acquire().await.ok()?;
        match tokio::time::timeout(self.timeout, self.source.get_page(url)).await {
            Ok(Ok(body)) => Some(body),
            Ok(Err(e)) => {
                debug!("Mirror request failed for {}: {}", url, e);
                None
            }
            Err(_) => {
                debug!("Mirror request timed out after {:?}: {}", self.timeout, url);
                None
            }
        }
    }

    /// Items of a structurally valid page, `None` for rate-limit or foreign pages
    fn structured_items(&self, mirror: &str, body: &str) -> Option<Vec<Tweet>> {
        if is_rate_limited(body) {
            debug!("⏳ {} is rate limited", mirror);
            return None;
        }
        if !has_timeline_structure(body) {
            debug!("{} returned a page without timeline items", mirror);
            return None;
        }
        Some(parse_timeline(body))
    }
}
