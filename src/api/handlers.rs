//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::types::*;
use crate::core::orchestrator::Scanner;
use crate::models::{AppError, ErrorCode, ScanResult};
use crate::utils::cache::ScanCache;
use crate::utils::telemetry::TelemetryCollector;

type ErrorReply = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub scanner: Arc<Scanner>,
    pub cache: ScanCache,
    pub start_time: Instant,
}

impl AppState {
    /// The scanner should already have `cache` attached as its store
    pub fn new(scanner: Arc<Scanner>, cache: ScanCache) -> Self {
        Self {
            scanner,
            cache,
            start_time: Instant::now(),
        }
    }

    pub fn telemetry(&self) -> &Arc<TelemetryCollector> {
        self.scanner.telemetry()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Background task: drop expired cache entries every `every`
    pub fn spawn_cache_cleanup(&self, every: Duration) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                cache.cleanup_expired();
            }
        });
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_reply(err: &AppError, start: Instant) -> ErrorReply {
    let status = StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))))
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Token Scan
// ============================================

pub async fn scan_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ScanResult>>, ErrorReply> {
    let start = Instant::now();

    let Json(req) = payload.map_err(|rejection| {
        warn!(code = ErrorCode::ApiBadRequest.as_str(), "Rejected scan request body: {}", rejection.body_text());
        error_reply(&AppError::bad_request(rejection.body_text()), start)
    })?;
    let address = req.address.trim();

    if let Some(cached) = state.cache.get(address) {
        return Ok(Json(ApiResponse::success(cached, elapsed_ms(start))));
    }

    match state.scanner.scan(address).await {
        Ok(result) => Ok(Json(ApiResponse::success(result, elapsed_ms(start)))),
        Err(e) => Err(error_reply(&e, start)),
    }
}

// ============================================
// Stats / Telemetry
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let cache_stats = state.cache.stats();
    let gate = state.scanner.scrape_gate();

    info!(
        "📊 Cache Stats: {} entries, {:.1}% hit rate ({} hits / {} misses)",
        cache_stats.entries, cache_stats.hit_rate, cache_stats.hits, cache_stats.misses
    );

    let data = StatsData {
        scans: state.telemetry().get_stats(),
        cache: cache_stats,
        scrape_slots_in_flight: gate.in_flight(),
        scrape_slots_peak: gate.peak_in_flight(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
