//! RugCheck security provider (Solana only)
//!
//! API: https://api.rugcheck.xyz/v1/tokens/{mint}/report/summary
//! Free tier, no API key required

use std::time::Duration;

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::{debug, info};

use super::provider::Provider;
use crate::models::{ProviderId, RiskLevel, SecurityReport, SecurityRisk, TokenAddress};
use crate::utils::constants::{PROVIDER_TIMEOUT_SECS, USER_AGENT};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RugCheckSummary {
    pub score: Option<f64>,
    #[serde(default, alias = "score_normalised")]
    pub score_normalised: Option<f64>,
    #[serde(default)]
    pub risks: Vec<RugCheckRisk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RugCheckRisk {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: String,
}

/// danger -> high, warn -> medium, anything else -> low
pub fn map_level(level: &str) -> RiskLevel {
    match level.to_ascii_lowercase().as_str() {
        "danger" => RiskLevel::High,
        "warn" | "warning" => RiskLevel::Medium,
        _ => RiskLevel::Low,
    }
}

impl RugCheckSummary {
    pub fn into_report(self) -> SecurityReport {
        let risks: Vec<SecurityRisk> = self
            .risks
            .into_iter()
            .map(|r| SecurityRisk {
                level: map_level(&r.level),
                description: if r.description.is_empty() {
                    r.name
                } else {
                    format!("{}: {}", r.name, r.description)
                },
            })
            .collect();

        let overall = if risks.iter().any(|r| r.level == RiskLevel::High) {
            "high"
        } else if risks.iter().any(|r| r.level == RiskLevel::Medium) {
            "medium"
        } else {
            "low"
        };

        SecurityReport {
            risk_level: Some(overall.to_string()),
            risks,
            score: self.score_normalised.or(self.score),
        }
    }
}

/// RugCheck API client
pub struct RugCheckClient {
    client: reqwest::Client,
    base_url: String,
}

impl RugCheckClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build RugCheck client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for RugCheckClient {
    type Output = SecurityReport;

    fn id(&self) -> ProviderId {
        ProviderId::RugCheck
    }

    async fn fetch(&self, address: &TokenAddress) -> Result<Option<SecurityReport>> {
        let url = format!("{}/tokens/{}/report/summary", self.base_url, address);
        debug!("🛡️ RugCheck: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre!("RugCheck request failed: {}", e))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(eyre!("RugCheck API error: {}", response.status()));
        }

        let summary: RugCheckSummary = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse RugCheck response: {}", e))?;

        let report = summary.into_report();
        info!(
            "🛡️ RugCheck {}: {} risks ({} high)",
            address,
            report.risks.len(),
            report.count(RiskLevel::High)
        );
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_to_report() {
        let summary: RugCheckSummary = serde_json::from_str(
            r#"{"score": 5101, "score_normalised": 41,
                "risks": [
                  {"name": "Mint Authority still enabled", "description": "More tokens can be minted", "level": "danger", "score": 5000},
                  {"name": "Low Liquidity", "description": "", "level": "warn", "score": 100},
                  {"name": "Mutable metadata", "level": "info"}
                ]}"#,
        )
        .unwrap();

        let report = summary.into_report();
        assert_eq!(report.risk_level.as_deref(), Some("high"));
        assert_eq!(report.count(RiskLevel::High), 1);
        assert_eq!(report.count(RiskLevel::Medium), 1);
        assert_eq!(report.count(RiskLevel::Low), 1);
        assert_eq!(report.risks[1].description, "Low Liquidity");
        assert_eq!(report.score, Some(41.0));
    }

    #[test]
    fn test_clean_report() {
        let summary: RugCheckSummary = serde_json::from_str(r#"{"score": 1, "risks": []}"#).unwrap();
        let report = summary.into_report();
        assert!(report.is_clean());
        assert_eq!(report.risk_level.as_deref(), Some("low"));
    }
}
