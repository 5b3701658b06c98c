//! Ruster Scanner Library
//!
//! Multi-provider token scanner for Solana and BNB Chain:
//! - Market data, chain fundamentals, security reports and holder counts
//!   fetched concurrently and reconciled into one snapshot
//! - Project timeline and ticker mentions from rate-limited feed mirrors
//! - Sentiment and a composite 1-100 token score with hard caps

pub mod api;
pub mod collaborators;
pub mod config;
pub mod core;
pub mod models;
pub mod providers;
pub mod social;
pub mod utils;

pub use collaborators::{HttpNarrativeClient, NarrativeContext, NarrativeGenerator, ScanStore};
pub use config::ScannerConfig;
pub use self::core::{Scanner, ScoreLimits, TokenScorer};
pub use models::{AppError, AppResult, ErrorCode, ScanEvent, ScanResult, TokenAddress};
pub use utils::{ScanCache, TelemetryCollector};
