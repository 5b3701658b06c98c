//! Core Module - Scan Pipeline & Scoring
//!
//! Address classification, provider reconciliation, sentiment, composite
//! token score and the orchestrator that runs them in order.

pub mod classifier;
pub mod orchestrator;
pub mod reconciler;
pub mod sentiment;
pub mod token_score;

pub use classifier::classify;
pub use orchestrator::Scanner;
pub use reconciler::{compute_market_cap, reconcile, ProviderOutputs};
pub use token_score::{HardCap, ScoreBreakdown, ScoreLimits, TokenScorer};
