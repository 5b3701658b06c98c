//! Moralis holder-count provider (both chains)
//!
//! EVM:    GET {evm}/erc20/{address}/holders?chain=bsc
//! Solana: GET {solana}/token/mainnet/holders/{address}
//!
//! Requires `MORALIS_API_KEY`; without it every fetch fails and the holder
//! count falls back to whatever the fundamentals provider embedded.

use std::time::Duration;

use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::debug;

use super::provider::Provider;
use crate::models::{ChainFamily, ProviderId, TokenAddress};
use crate::utils::constants::{
    DEFAULT_MORALIS_EVM_URL, DEFAULT_MORALIS_SOLANA_URL, PROVIDER_TIMEOUT_SECS, USER_AGENT,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HolderSummary {
    total_holders: Option<u64>,
}

/// Moralis API client
pub struct MoralisClient {
    client: reqwest::Client,
    api_key: Option<String>,
    evm_url: String,
    solana_url: String,
}

impl MoralisClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build Moralis client: {}", e))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            evm_url: DEFAULT_MORALIS_EVM_URL.to_string(),
            solana_url: DEFAULT_MORALIS_SOLANA_URL.to_string(),
        })
    }

    pub fn with_urls(mut self, evm_url: impl Into<String>, solana_url: impl Into<String>) -> Self {
        self.evm_url = evm_url.into();
        self.solana_url = solana_url.into();
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn holders_url(&self, address: &TokenAddress) -> String {
        match address.chain() {
            ChainFamily::BnbChain => format!(
                "{}/erc20/{}/holders?chain=bsc",
                self.evm_url.trim_end_matches('/'),
                address
            ),
            ChainFamily::Solana => format!(
                "{}/token/mainnet/holders/{}",
                self.solana_url.trim_end_matches('/'),
                address
            ),
        }
    }
}

#[async_trait]
impl Provider for MoralisClient {
    type Output = u64;

    fn id(&self) -> ProviderId {
        ProviderId::Moralis
    }

    async fn fetch(&self, address: &TokenAddress) -> Result<Option<u64>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| eyre!("MORALIS_API_KEY not configured"))?;

        let url = self.holders_url(address);
        debug!("👥 Moralis: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", api_key)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| eyre!("Moralis request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("Moralis API error: {}", response.status()));
        }

        let summary: HolderSummary = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse Moralis response: {}", e))?;

        Ok(summary.total_holders)
    }
}
