//! Token Scoring Module
//!
//! Composite 1-100 quality score: base 30 plus independent additive terms,
//! then four hard caps in fixed order, then the strong-indicator gate.
//!
//! Caps are ceilings only and are applied in this order:
//! 1. liquidity below threshold
//! 2. holders below threshold
//! 3. any security risk
//! 4. any Solana mint/freeze authority
//!
//! Thresholds live in [`ScoreLimits`] so deployments can retune them.

use serde::Serialize;

use crate::models::{ChainFamily, RiskLevel, SecurityCoverage, TokenSnapshot};

const BASE_SCORE: f64 = 30.0;

/// Tunable thresholds for caps and the strong-indicator gate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreLimits {
    pub liquidity_cap_below_usd: f64,
    pub liquidity_cap: f64,
    pub holders_cap_below: u64,
    pub holders_cap: f64,
    pub risk_cap: f64,
    pub authority_cap: f64,
    /// Scores above this need enough strong indicators
    pub strong_gate: f64,
    pub strong_required: usize,
    pub strong_liquidity_usd: f64,
    pub strong_holders: u64,
    pub strong_volume_usd: f64,
}

impl Default for ScoreLimits {
    fn default() -> Self {
        Self {
            liquidity_cap_below_usd: 50_000.0,
            liquidity_cap: 60.0,
            holders_cap_below: 100,
            holders_cap: 50.0,
            risk_cap: 40.0,
            authority_cap: 30.0,
            strong_gate: 70.0,
            strong_required: 4,
            strong_liquidity_usd: 100_000.0,
            strong_holders: 1_000,
            strong_volume_usd: 100_000.0,
        }
    }
}

/// Hard caps in application order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HardCap {
    LowLiquidity,
    FewHolders,
    SecurityRisk,
    AuthorityPresent,
}

impl HardCap {
    pub const ORDER: [HardCap; 4] = [
        HardCap::LowLiquidity,
        HardCap::FewHolders,
        HardCap::SecurityRisk,
        HardCap::AuthorityPresent,
    ];
}

/// Individual term contributing to the score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreFactor {
    pub name: &'static str,
    pub points: f64,
}

/// Score with its derivation, for logging and the API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total: u8,
    pub raw_sum: f64,
    pub factors: Vec<ScoreFactor>,
    pub caps_applied: Vec<HardCap>,
    pub strong_indicators: usize,
    pub gated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TokenScorer {
    limits: ScoreLimits,
}

impl TokenScorer {
    pub fn new(limits: ScoreLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ScoreLimits {
        &self.limits
    }

    pub fn score(&self, snapshot: &TokenSnapshot, sentiment: Option<u8>) -> u8 {
        self.breakdown(snapshot, sentiment).total
    }

    pub fn breakdown(&self, snapshot: &TokenSnapshot, sentiment: Option<u8>) -> ScoreBreakdown {
        let factors = self.factors(snapshot, sentiment);
        let raw_sum = BASE_SCORE + factors.iter().map(|f| f.points).sum::<f64>();

        let triggered: Vec<HardCap> = HardCap::ORDER
            .into_iter()
            .filter(|cap| self.cap_triggered(*cap, snapshot))
            .collect();
        let capped = self.apply_caps(raw_sum, &triggered);

        let strong_indicators = self.strong_indicators(snapshot);
        let gated = capped > self.limits.strong_gate && strong_indicators < self.limits.strong_required;
        let gated_score = if gated { self.limits.strong_gate } else { capped };

        ScoreBreakdown {
            total: gated_score.round().clamp(1.0, 100.0) as u8,
            raw_sum,
            factors,
            caps_applied: triggered,
            strong_indicators,
            gated,
        }
    }

    /// Fold the triggered caps over `score` in [`HardCap::ORDER`]
    pub fn apply_caps(&self, score: f64, triggered: &[HardCap]) -> f64 {
        HardCap::ORDER
            .into_iter()
            .filter(|cap| triggered.contains(cap))
            .fold(score, |acc, cap| acc.min(self.cap_value(cap)))
    }

    pub fn cap_value(&self, cap: HardCap) -> f64 {
        match cap {
            HardCap::LowLiquidity => self.limits.liquidity_cap,
            HardCap::FewHolders => self.limits.holders_cap,
            HardCap::SecurityRisk => self.limits.risk_cap,
            HardCap::AuthorityPresent => self.limits.authority_cap,
        }
    }

    pub fn cap_triggered(&self, cap: HardCap, snapshot: &TokenSnapshot) -> bool {
        match cap {
            HardCap::LowLiquidity => snapshot
                .market
                .liquidity_usd
                .is_some_and(|l| l < self.limits.liquidity_cap_below_usd),
            HardCap::FewHolders => snapshot
                .holder_count
                .is_some_and(|h| h < self.limits.holders_cap_below),
            HardCap::SecurityRisk => snapshot
                .security
                .report()
                .is_some_and(|r| !r.is_clean()),
            HardCap::AuthorityPresent => snapshot
                .authorities()
                .is_some_and(|(mint, freeze)| mint || freeze),
        }
    }

    /// Count of satisfied strong-indicator predicates (out of six)
    pub fn strong_indicators(&self, snapshot: &TokenSnapshot) -> usize {
        let l = &self.limits;
        let no_authority = match snapshot.chain() {
            ChainFamily::BnbChain => true,
            ChainFamily::Solana => snapshot.authorities() == Some((false, false)),
        };
        [
            snapshot.market.liquidity_usd.is_some_and(|v| v > l.strong_liquidity_usd),
            snapshot.holder_count.is_some_and(|h| h > l.strong_holders),
            snapshot.security.report().is_some_and(|r| r.is_clean()),
            no_authority,
            !snapshot.socials.is_empty(),
            snapshot.market.volume_24h.is_some_and(|v| v > l.strong_volume_usd),
        ]
        .iter()
        .filter(|ok| **ok)
        .count()
    }

    fn factors(&self, snapshot: &TokenSnapshot, sentiment: Option<u8>) -> Vec<ScoreFactor> {
        vec![
            ScoreFactor {
                name: "liquidity",
                points: liquidity_points(snapshot.market.liquidity_usd),
            },
            ScoreFactor {
                name: "holders",
                points: holder_points(snapshot.holder_count),
            },
            ScoreFactor {
                name: "market_cap",
                points: market_cap_points(snapshot.market.market_cap),
            },
            ScoreFactor {
                name: "security",
                points: security_points(snapshot),
            },
            ScoreFactor {
                name: "socials",
                points: social_points(snapshot),
            },
            ScoreFactor {
                name: "volume",
                points: volume_points(snapshot.market.volume_24h),
            },
            ScoreFactor {
                name: "sentiment",
                points: match sentiment {
                    Some(s) => f64::from(s) / 100.0 * 8.0,
                    None => -3.0,
                },
            },
        ]
    }
}

fn liquidity_points(liquidity: Option<f64>) -> f64 {
    match liquidity {
        None => -20.0,
        Some(l) if l < 1_000.0 => -15.0,
        Some(l) if l < 10_000.0 => -8.0,
        Some(l) if l < 50_000.0 => -3.0,
        Some(l) if l < 100_000.0 => 3.0,
        Some(l) if l < 500_000.0 => 6.0,
        Some(l) if l < 1_000_000.0 => 9.0,
        Some(_) => 12.0,
    }
}

fn holder_points(holders: Option<u64>) -> f64 {
    match holders {
        None => -8.0,
        Some(h) if h < 50 => -10.0,
        Some(h) if h < 100 => -5.0,
        Some(h) if h < 500 => 0.0,
        Some(h) if h < 1_000 => 4.0,
        Some(h) if h < 10_000 => 8.0,
        Some(_) => 12.0,
    }
}

fn market_cap_points(market_cap: Option<f64>) -> f64 {
    match market_cap {
        None => 0.0,
        Some(m) if m < 100_000.0 => -5.0,
        Some(m) if m < 1_000_000.0 => 0.0,
        Some(m) if m < 10_000_000.0 => 3.0,
        Some(m) if m < 100_000_000.0 => 6.0,
        Some(m) if m < 1_000_000_000.0 => 8.0,
        Some(_) => 10.0,
    }
}

fn volume_points(volume: Option<f64>) -> f64 {
    match volume {
        None => -5.0,
        Some(v) if v < 1_000.0 => -8.0,
        Some(v) if v < 10_000.0 => -4.0,
        Some(v) if v < 50_000.0 => 0.0,
        Some(v) if v < 100_000.0 => 3.0,
        Some(v) if v < 1_000_000.0 => 6.0,
        Some(_) => 9.0,
    }
}

fn security_points(snapshot: &TokenSnapshot) -> f64 {
    let report_points = match &snapshot.security {
        SecurityCoverage::Unsupported => -5.0,
        SecurityCoverage::Unavailable => -10.0,
        SecurityCoverage::Report(r) if r.is_clean() => 10.0,
        SecurityCoverage::Report(r) => {
            -15.0 * r.count(RiskLevel::High) as f64 - 8.0 * r.count(RiskLevel::Medium) as f64
        }
    };

    let authority_points = match snapshot.authorities() {
        None => 0.0,
        Some((false, false)) => 3.0,
        Some((mint, freeze)) => -15.0 * (u8::from(mint) + u8::from(freeze)) as f64,
    };

    report_points + authority_points
}

fn social_points(snapshot: &TokenSnapshot) -> f64 {
    let links = &snapshot.socials;
    if links.is_empty() {
        return -8.0;
    }
    [(links.website.is_some(), 2.0), (links.x.is_some(), 2.0), (links.telegram.is_some(), 1.0)]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum()
}
