//! Ruster Scanner CLI
//!
//! Runs one scan and prints the result as JSON. Intermediate artifacts are
//! logged as each stage completes.
//!
//! Usage:
//!   ruster_scanner <contract_address>

use eyre::{eyre, Result};
use ruster_scanner::{ScanEvent, Scanner, ScannerConfig};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let address = std::env::args()
        .nth(1)
        .ok_or_else(|| eyre!("usage: ruster_scanner <contract_address>"))?;

    let config = ScannerConfig::from_env();
    let scanner = Scanner::from_config(&config)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_event(&event);
        }
    });

    let result = scanner.scan_with_events(&address, Some(tx)).await;
    // The sender is dropped with the scan, which ends the progress loop
    progress.await.ok();

    let result = result.map_err(|e| eyre!("{}", e))?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn log_event(event: &ScanEvent) {
    match event {
        ScanEvent::MarketDataReady { market, .. } => info!(
            "📈 Market: price={:?} liquidity={:?} volume24h={:?}",
            market.price_usd, market.liquidity_usd, market.volume_24h
        ),
        ScanEvent::SecurityReady { security, .. } => match security {
            Some(report) => info!("🛡️ Security: {} risks ({:?})", report.risks.len(), report.risk_level),
            None => info!("🛡️ Security: no report"),
        },
        ScanEvent::SentimentReady { sentiment_score, .. } => info!("💬 Sentiment: {:?}", sentiment_score),
        ScanEvent::ScoreReady { token_score, .. } => info!("🏁 Token score: {}", token_score),
    }
}
