//! Scan telemetry
//!
//! In-process counters exposed on `/v1/stats`. No addresses are stored.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::ChainFamily;

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryStats {
    pub scans_completed: u64,
    pub scans_failed: u64,
    pub scans_by_chain: HashMap<String, u64>,
    /// Enrichment providers that came back absent (failure, timeout or no data)
    pub enrichments_absent: u64,
    pub scrapes_exhausted: u64,
    pub narrative_fallbacks: u64,
    pub avg_latency_ms: f64,
    pub avg_token_score: f64,
    pub session_start: Option<DateTime<Utc>>,
}

/// Main telemetry collector
pub struct TelemetryCollector {
    scans_completed: AtomicU64,
    scans_failed: AtomicU64,
    enrichments_absent: AtomicU64,
    scrapes_exhausted: AtomicU64,
    narrative_fallbacks: AtomicU64,
    total_latency_ms: AtomicU64,
    total_score: AtomicU64,
    by_chain: RwLock<HashMap<ChainFamily, u64>>,
    session_start: DateTime<Utc>,
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            scans_completed: AtomicU64::new(0),
            scans_failed: AtomicU64::new(0),
            enrichments_absent: AtomicU64::new(0),
            scrapes_exhausted: AtomicU64::new(0),
            narrative_fallbacks: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            total_score: AtomicU64::new(0),
            by_chain: RwLock::new(HashMap::new()),
            session_start: Utc::now(),
        }
    }

    pub fn record_scan(&self, chain: ChainFamily, token_score: u8, latency_ms: u64) {
        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.total_score.fetch_add(u64::from(token_score), Ordering::Relaxed);
        if let Ok(mut counts) = self.by_chain.write() {
            *counts.entry(chain).or_insert(0) += 1;
        }
    }

    pub fn record_failure(&self) {
        self.scans_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_absent_enrichments(&self, count: u64) {
        self.enrichments_absent.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_scrape_exhausted(&self) {
        self.scrapes_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_narrative_fallback(&self) {
        self.narrative_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> TelemetryStats {
        let completed = self.scans_completed.load(Ordering::Relaxed);
        let average = |total: u64| {
            if completed > 0 {
                total as f64 / completed as f64
            } else {
                0.0
            }
        };

        let scans_by_chain = self
            .by_chain
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(chain, n)| (chain.name().to_string(), *n))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            scans_completed: completed,
            scans_failed: self.scans_failed.load(Ordering::Relaxed),
            scans_by_chain,
            enrichments_absent: self.enrichments_absent.load(Ordering::Relaxed),
            scrapes_exhausted: self.scrapes_exhausted.load(Ordering::Relaxed),
            narrative_fallbacks: self.narrative_fallbacks.load(Ordering::Relaxed),
            avg_latency_ms: average(self.total_latency_ms.load(Ordering::Relaxed)),
            avg_token_score: average(self.total_score.load(Ordering::Relaxed)),
            session_start: Some(self.session_start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_averages() {
        let telemetry = TelemetryCollector::new();
        telemetry.record_scan(ChainFamily::Solana, 80, 1200);
        telemetry.record_scan(ChainFamily::BnbChain, 40, 800);
        telemetry.record_failure();
        telemetry.record_absent_enrichments(3);
        telemetry.record_scrape_exhausted();

        let stats = telemetry.get_stats();
        assert_eq!(stats.scans_completed, 2);
        assert_eq!(stats.scans_failed, 1);
        assert_eq!(stats.enrichments_absent, 3);
        assert_eq!(stats.scrapes_exhausted, 1);
        assert_eq!(stats.avg_latency_ms, 1000.0);
        assert_eq!(stats.avg_token_score, 60.0);
        assert_eq!(stats.scans_by_chain.get("BNB Chain"), Some(&1));
    }

    #[test]
    fn test_empty_stats() {
        let stats = TelemetryCollector::new().get_stats();
        assert_eq!(stats.scans_completed, 0);
        assert_eq!(stats.avg_latency_ms, 0.0);
    }
}
