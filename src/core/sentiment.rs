//! Sentiment scoring
//!
//! Pure function over market momentum, volume and tweet engagement.
//! Returns `None` only when there is neither a market signal nor a tweet.

use crate::models::{MarketData, TokenSnapshot, Tweet};

/// Engagement above this marks a tweet as high-engagement
pub const HIGH_ENGAGEMENT_THRESHOLD: u64 = 50;

const PRICE_WEIGHT: f64 = 0.25;
const VOLUME_WEIGHT: f64 = 0.25;
const SOCIAL_WEIGHT: f64 = 0.5;

/// Per-component values, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentComponents {
    pub price: f64,
    pub volume: f64,
    pub social: f64,
}

/// The source with more present price/volume fields; ties favour `primary`
pub fn richer_market<'a>(primary: &'a MarketData, secondary: Option<&'a MarketData>) -> &'a MarketData {
    match secondary {
        Some(s) if s.richness() > primary.richness() => s,
        _ => primary,
    }
}

/// Sentiment for a reconciled snapshot with social data attached
pub fn score_snapshot(snapshot: &TokenSnapshot) -> Option<u8> {
    let market = richer_market(&snapshot.market, snapshot.secondary_market.as_ref());
    let tweets: Vec<&Tweet> = snapshot.all_tweets().collect();
    score_sentiment(market, &tweets)
}

pub fn score_sentiment(market: &MarketData, tweets: &[&Tweet]) -> Option<u8> {
    if !market.has_signal() && tweets.is_empty() {
        return None;
    }

    let c = components(market, tweets);
    let weighted = PRICE_WEIGHT * c.price + VOLUME_WEIGHT * c.volume + SOCIAL_WEIGHT * c.social;
    let mut score = (weighted * 100.0).round();

    if !tweets.is_empty() {
        let high = high_engagement_count(tweets);
        let floor = if high >= 3 {
            55.0
        } else if tweets.len() >= 5 {
            40.0
        } else {
            30.0
        };
        score = score.max(floor);
    }

    Some(score.clamp(0.0, 100.0) as u8)
}

pub fn components(market: &MarketData, tweets: &[&Tweet]) -> SentimentComponents {
    SentimentComponents {
        price: price_component(market.price_change_24h),
        volume: volume_component(market.volume_24h),
        social: social_component(tweets),
    }
}

/// 0% -> 0.5, linear to the ±30% saturation points, +0.1 above +10%
fn price_component(change_24h: Option<f64>) -> f64 {
    let Some(change) = change_24h.filter(|c| c.is_finite()) else {
        return 0.5;
    };
    let mut value = 0.5 + change.clamp(-30.0, 30.0) / 60.0;
    if change > 10.0 {
        value += 0.1;
    }
    value.clamp(0.0, 1.0)
}

/// log10(volume) / 7, floored at 0.2, saturating at $10M
fn volume_component(volume_24h: Option<f64>) -> f64 {
    match volume_24h {
        Some(v) if v.is_finite() && v > 0.0 => (v.log10() / 7.0).clamp(0.2, 1.0),
        _ => 0.2,
    }
}

fn social_component(tweets: &[&Tweet]) -> f64 {
    if tweets.is_empty() {
        return 0.0;
    }
    let count = tweets.len() as f64;
    let total_engagement: f64 = tweets.iter().map(|t| t.engagement() as f64).sum();
    let avg_engagement = total_engagement / count;
    let high = high_engagement_count(tweets) as f64;

    let count_term = (0.03 * count).min(0.3);
    let engagement_term = ((1.0 + avg_engagement).log10() / 3.0 * 0.4).min(0.4);
    let high_term = (0.1 * high).min(0.3);
    count_term + engagement_term + high_term
}

fn high_engagement_count(tweets: &[&Tweet]) -> usize {
    tweets
        .iter()
        .filter(|t| t.engagement() > HIGH_ENGAGEMENT_THRESHOLD)
        .count()
}
