//! In-memory scan cache
//!
//! DashMap keyed by normalized address with per-entry TTL. Implements the
//! fire-and-forget save contract; the HTTP layer reads it before scanning.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use eyre::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::collaborators::ScanStore;
use crate::models::{ChainFamily, ScanResult, TokenAddress};
use crate::utils::constants::DEFAULT_CACHE_TTL_SECS;

#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub result: ScanResult,
    pub created_at: Instant,
    pub ttl_secs: u64,
}

impl CacheEntry {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= Duration::from_secs(self.ttl_secs)
    }

    pub fn remaining_ttl(&self) -> u64 {
        self.ttl_secs.saturating_sub(self.created_at.elapsed().as_secs())
    }
}

#[derive(Clone)]
pub struct ScanCache {
    store: Arc<DashMap<String, CacheEntry>>,
    ttl_secs: u64,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL_SECS)
    }
}

impl ScanCache {
    pub fn with_ttl(ttl_secs: u64) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            ttl_secs,
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// EVM addresses are case-insensitive; base58 is not
    fn normalize_address(address: &str) -> String {
        let trimmed = address.trim();
        match TokenAddress::parse(trimmed) {
            Ok(a) if a.chain() == ChainFamily::BnbChain => trimmed.to_lowercase(),
            _ => trimmed.to_string(),
        }
    }

    pub fn get(&self, address: &str) -> Option<ScanResult> {
        let key = Self::normalize_address(address);

        let Some(entry) = self.store.get(&key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS: {}", key);
            return None;
        };

        if entry.is_expired() {
            drop(entry); // Release read lock
            self.store.remove(&key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("📭 CACHE MISS (expired): {}", key);
            return None;
        }

        self.hits.fetch_add(1, Ordering::Relaxed);
        info!("✅ CACHE HIT: {} (TTL: {}s remaining)", key, entry.remaining_ttl());
        Some(entry.result.clone())
    }

    pub fn set(&self, address: &str, result: ScanResult) {
        let key = Self::normalize_address(address);
        self.store.insert(
            key.clone(),
            CacheEntry {
                result,
                created_at: Instant::now(),
                ttl_secs: self.ttl_secs,
            },
        );
        debug!("💾 CACHE SET: {} (TTL: {}s)", key, self.ttl_secs);
    }

    pub fn cleanup_expired(&self) -> usize {
        let before = self.store.len();
        self.store.retain(|_, entry| !entry.is_expired());
        let removed = before - self.store.len();
        if removed > 0 {
            info!("🧹 CACHE CLEANUP: {} expired entries removed", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate: if total > 0 {
                hits as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            ttl_secs: self.ttl_secs,
        }
    }
}

#[async_trait]
impl ScanStore for ScanCache {
    async fn save(&self, address: &str, result: &ScanResult) -> Result<()> {
        self.set(address, result.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token_score::fixtures::{snapshot, BNB, SOL};
    use crate::models::NarrativeText;
    use uuid::Uuid;

    fn result_for(address: &str) -> ScanResult {
        let s = snapshot(address).with_scores(None, 12);
        ScanResult::from_snapshot(Uuid::new_v4(), &s, NarrativeText::placeholder())
    }

    #[tokio::test]
    async fn test_save_then_get() {
        let cache = ScanCache::default();
        cache.save(SOL, &result_for(SOL)).await.unwrap();

        let hit = cache.get(SOL).unwrap();
        assert_eq!(hit.token_score, 12);
        assert!(cache.get(&SOL.to_lowercase()).is_none());
    }

    #[test]
    fn test_evm_address_normalization() {
        let cache = ScanCache::default();
        cache.set(BNB, result_for(BNB));
        assert!(cache.get(&BNB.to_lowercase()).is_some());

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = ScanCache::with_ttl(0);
        cache.set(SOL, result_for(SOL));
        assert!(cache.get(SOL).is_none());
        assert_eq!(cache.stats().entries, 0);
        assert_eq!(cache.cleanup_expired(), 0);
    }
}
