//! Intermediate scan artifacts
//!
//! Each variant is emitted the moment its stage completes so a transport
//! (SSE, websocket, chat bot) can forward it without waiting for the full scan.

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::{MarketData, SecurityReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    MarketDataReady {
        scan_id: Uuid,
        market: MarketData,
    },
    SecurityReady {
        scan_id: Uuid,
        security: Option<SecurityReport>,
    },
    SentimentReady {
        scan_id: Uuid,
        sentiment_score: Option<u8>,
    },
    ScoreReady {
        scan_id: Uuid,
        token_score: u8,
    },
}

impl ScanEvent {
    pub fn scan_id(&self) -> Uuid {
        match self {
            Self::MarketDataReady { scan_id, .. }
            | Self::SecurityReady { scan_id, .. }
            | Self::SentimentReady { scan_id, .. }
            | Self::ScoreReady { scan_id, .. } => *scan_id,
        }
    }
}

/// Optional per-scan event channel
#[derive(Clone)]
pub struct EventSink {
    scan_id: Uuid,
    tx: Option<mpsc::UnboundedSender<ScanEvent>>,
}

impl EventSink {
    pub fn new(scan_id: Uuid, tx: Option<mpsc::UnboundedSender<ScanEvent>>) -> Self {
        Self { scan_id, tx }
    }

    pub fn scan_id(&self) -> Uuid {
        self.scan_id
    }

    /// A dropped receiver is not an error; the scan carries on
    pub fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
