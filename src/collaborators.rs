//! External collaborators: narrative generation and scan persistence
//!
//! The scanner only talks to these through the two traits below. Narrative
//! text is opaque; the scanner never inspects what comes back.

use std::time::Duration;

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Serialize;

use crate::models::{
    MarketData, NarrativeText, ScanResult, SecurityReport, SocialLinks, TokenSnapshot, Tweet,
};
use crate::utils::constants::{NARRATIVE_TWEET_LIMIT, USER_AGENT};

/// Bounded context handed to the narrative generator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContext {
    pub contract_address: String,
    pub blockchain: String,
    pub token_name: String,
    pub symbol: String,
    pub market_data: MarketData,
    pub holder_count: Option<u64>,
    pub security_data: Option<SecurityReport>,
    pub socials: SocialLinks,
    pub sentiment_score: Option<u8>,
    pub token_score: Option<u8>,
    /// Highest-engagement tweets from both feeds
    pub tweets: Vec<Tweet>,
}

impl NarrativeContext {
    pub fn from_snapshot(snapshot: &TokenSnapshot) -> Self {
        let mut tweets: Vec<Tweet> = snapshot.all_tweets().cloned().collect();
        // Stable sort keeps feed order among equal engagement
        tweets.sort_by(|a, b| b.engagement().cmp(&a.engagement()));
        tweets.truncate(NARRATIVE_TWEET_LIMIT);

        Self {
            contract_address: snapshot.address.to_string(),
            blockchain: snapshot.chain().name().to_string(),
            token_name: snapshot.name.clone(),
            symbol: snapshot.symbol.clone(),
            market_data: snapshot.market.clone(),
            holder_count: snapshot.holder_count,
            security_data: snapshot.security.report().cloned(),
            socials: snapshot.socials.clone(),
            sentiment_score: snapshot.sentiment_score,
            token_score: snapshot.token_score,
            tweets,
        }
    }
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, context: &NarrativeContext) -> Result<NarrativeText>;
}

/// Fire-and-forget persistence. Failures are logged by the caller, never surfaced.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn save(&self, address: &str, result: &ScanResult) -> Result<()>;
}

/// Narrative service over HTTP: POST the context as JSON, read back the three text fields
pub struct HttpNarrativeClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpNarrativeClient {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build narrative client: {}", e))?;

        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

#[async_trait]
impl NarrativeGenerator for HttpNarrativeClient {
    async fn generate(&self, context: &NarrativeContext) -> Result<NarrativeText> {
        let mut request = self.client.post(&self.url).json(context);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| eyre!("Narrative request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("Narrative API error: {}", response.status()));
        }

        response
            .json::<NarrativeText>()
            .await
            .map_err(|e| eyre!("Failed to parse narrative response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::token_score::fixtures::{snapshot, SOL};
    use crate::models::TweetCollection;

    fn tweet(author: &str, likes: u64) -> Tweet {
        Tweet {
            text: "$TEST".to_string(),
            author: author.to_string(),
            date: String::new(),
            likes,
            retweets: 0,
            url: String::new(),
        }
    }

    #[test]
    fn test_context_is_bounded_and_ranked() {
        let profile: Vec<Tweet> = (0..5).map(|i| tweet("dev", i)).collect();
        let ticker: Vec<Tweet> = (0..5).map(|i| tweet("fan", 100 + i)).collect();
        let s = snapshot(SOL).with_social(
            TweetCollection::new(profile, "https://a.mirror"),
            TweetCollection::new(ticker, "https://b.mirror"),
        );

        let context = NarrativeContext::from_snapshot(&s);
        assert_eq!(context.tweets.len(), NARRATIVE_TWEET_LIMIT);
        assert_eq!(context.tweets[0].likes, 104);
        assert_eq!(context.tweets[9].likes, 0);
        assert_eq!(context.blockchain, "Solana");
        assert!(context.security_data.is_none());
    }
}
