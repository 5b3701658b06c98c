//! Scan output returned to callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Fundamentals, MarketData, SecurityReport, SocialLinks, TokenSnapshot, TweetCollection};
use crate::utils::constants::NARRATIVE_UNAVAILABLE;

/// Text produced by the narrative collaborator, passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeText {
    pub narrative: String,
    pub verdict: String,
    pub summary: String,
}

impl NarrativeText {
    pub fn placeholder() -> Self {
        Self {
            narrative: NARRATIVE_UNAVAILABLE.to_string(),
            verdict: NARRATIVE_UNAVAILABLE.to_string(),
            summary: NARRATIVE_UNAVAILABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub contract_address: String,
    pub blockchain: String,
    pub token_name: String,
    pub symbol: String,
    pub market_data: MarketData,
    pub fundamentals: Fundamentals,
    /// `null` when the chain has no security data
    pub security_data: Option<SecurityReport>,
    pub socials: SocialLinks,
    pub sentiment_score: Option<u8>,
    pub token_score: u8,
    pub twitter_data: TweetCollection,
    pub ticker_tweets: TweetCollection,
    pub narrative: String,
    pub verdict: String,
    pub summary: String,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn from_snapshot(scan_id: Uuid, snapshot: &TokenSnapshot, text: NarrativeText) -> Self {
        let fundamentals = Fundamentals {
            decimals: Some(snapshot.decimals),
            holder_count: snapshot.holder_count,
            ..snapshot.fundamentals.clone().unwrap_or_default()
        };

        Self {
            scan_id,
            contract_address: snapshot.address.to_string(),
            blockchain: snapshot.chain().name().to_string(),
            token_name: snapshot.name.clone(),
            symbol: snapshot.symbol.clone(),
            market_data: snapshot.market.clone(),
            fundamentals,
            security_data: snapshot.security.report().cloned(),
            socials: snapshot.socials.clone(),
            sentiment_score: snapshot.sentiment_score,
            token_score: snapshot.token_score.unwrap_or(1),
            twitter_data: snapshot.twitter.clone(),
            ticker_tweets: snapshot.ticker_tweets.clone(),
            narrative: text.narrative,
            verdict: text.verdict,
            summary: text.summary,
            scanned_at: Utc::now(),
        }
    }
}
