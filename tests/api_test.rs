//! HTTP handlers driven directly with in-memory scanner collaborators

mod common;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use common::*;
use std::sync::Arc;
use std::time::Duration;

use ruster_scanner::api::handlers::{get_stats, health_check, scan_token};
use ruster_scanner::api::{AppState, ScanRequest};
use ruster_scanner::models::*;
use ruster_scanner::ScanCache;

const MIRROR: &str = "https://mirror.test";

fn state(providers: &Providers) -> Arc<AppState> {
    let cache = ScanCache::default();
    let scanner = scanner(providers, feeds(&[MIRROR], Arc::new(bonk_pages(MIRROR)), 2))
        .with_store(Arc::new(cache.clone()));
    Arc::new(AppState::new(Arc::new(scanner), cache))
}

fn request(address: &str) -> Json<ScanRequest> {
    Json(ScanRequest {
        address: address.to_string(),
    })
}

#[tokio::test]
async fn test_scan_then_served_from_cache() {
    let providers = Providers::default();
    let state = state(&providers);

    let Json(first) = scan_token(State(state.clone()), Ok(request(SOL))).await.unwrap();
    assert!(first.success);
    let first = first.data.unwrap();
    assert_eq!(first.symbol, "BONK");

    tokio::time::sleep(Duration::from_millis(20)).await;

    let Json(second) = scan_token(State(state.clone()), Ok(request(&format!("  {}  ", SOL))))
        .await
        .unwrap();
    assert_eq!(second.data.unwrap().scan_id, first.scan_id);
    assert_eq!(providers.market.call_count(), 1);
    assert_eq!(state.cache.stats().hits, 1);
}

#[tokio::test]
async fn test_invalid_address_is_bad_request() {
    let providers = Providers::default();
    let state = state(&providers);

    let (status, Json(body)) = scan_token(State(state), Ok(request("definitely not an address")))
        .await
        .unwrap_err();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.success);
    let error = body.error.unwrap();
    assert_eq!(error.code, "TOKEN_INVALID_ADDRESS");
    assert!(!error.retryable);
}

#[tokio::test]
async fn test_market_outage_is_bad_gateway() {
    let providers = Providers {
        market: Arc::new(StaticProvider::failing(ProviderId::DexScreener)),
        ..Default::default()
    };
    let state = state(&providers);

    let (status, Json(body)) = scan_token(State(state.clone()), Ok(request(BNB))).await.unwrap_err();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let error = body.error.unwrap();
    assert_eq!(error.code, "PRIMARY_DATA_UNAVAILABLE");
    assert!(error.retryable);

    let Json(stats) = get_stats(State(state)).await;
    assert_eq!(stats.data.unwrap().scans.scans_failed, 1);
}

#[tokio::test]
async fn test_stats_and_health() {
    let providers = Providers::default();
    let state = state(&providers);
    scan_token(State(state.clone()), Ok(request(SOL))).await.unwrap();

    let Json(stats) = get_stats(State(state.clone())).await;
    let stats = stats.data.unwrap();
    assert_eq!(stats.scans.scans_completed, 1);
    assert_eq!(stats.scans.scans_by_chain.get("Solana"), Some(&1));
    assert!(stats.scrape_slots_peak <= 2);
    assert_eq!(stats.scrape_slots_in_flight, 0);

    let Json(health) = health_check(State(state)).await;
    assert_eq!(health.data.unwrap().status, "healthy");
}
