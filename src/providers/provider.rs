//! Provider capability and per-chain lookup table
//!
//! Every external source implements [`Provider`]. The orchestrator never
//! branches on chain at call sites; it asks the registry for the chain's
//! provider set and fans out over whatever is there.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, warn};

use crate::models::{
    AppError, AppResult, ChainFamily, ErrorCode, Fundamentals, MarketQuote, ProviderId,
    ProviderResult, SecurityReport, TokenAddress,
};
use crate::utils::constants::PROVIDER_TIMEOUT_SECS;

/// One external data source
#[async_trait]
pub trait Provider: Send + Sync {
    type Output: Send;

    fn id(&self) -> ProviderId;

    /// `Ok(None)` means the source answered but has nothing for this address
    async fn fetch(&self, address: &TokenAddress) -> Result<Option<Self::Output>>;
}

pub type DynProvider<T> = Arc<dyn Provider<Output = T>>;

/// Enrichment fetch: timeouts and errors are logged and folded into `absent`
pub async fn fetch_isolated<T: Send>(
    provider: &DynProvider<T>,
    address: &TokenAddress,
    timeout: Duration,
) -> ProviderResult<T> {
    let id = provider.id();
    match tokio::time::timeout(timeout, provider.fetch(address)).await {
        Ok(Ok(Some(value))) => ProviderResult::present(id, value),
        Ok(Ok(None)) => {
            debug!("📭 {}: no data for {}", id.as_str(), address);
            ProviderResult::absent(id)
        }
        Ok(Err(e)) => {
            warn!(code = ErrorCode::ProviderUnavailable.as_str(), provider = id.as_str(), "⚠️ {} failed: {}", id.as_str(), e);
            ProviderResult::absent(id)
        }
        Err(_) => {
            warn!(code = ErrorCode::ProviderUnavailable.as_str(), provider = id.as_str(), "⏱️ {} timed out after {:?}", id.as_str(), timeout);
            ProviderResult::absent(id)
        }
    }
}

/// Primary (market-data) fetch: the one provider whose failure reaches the caller
pub async fn fetch_primary<T: Send>(
    provider: &DynProvider<T>,
    address: &TokenAddress,
    timeout: Duration,
) -> AppResult<ProviderResult<T>> {
    let id = provider.id();
    match tokio::time::timeout(timeout, provider.fetch(address)).await {
        Ok(Ok(value)) => Ok(ProviderResult { value, source: id }),
        Ok(Err(e)) => Err(AppError::primary_unavailable(format!("{} failed: {}", id.as_str(), e))),
        Err(_) => Err(AppError::primary_unavailable(format!(
            "{} timed out after {:?}",
            id.as_str(),
            timeout
        ))),
    }
}

/// Chain-specific providers
#[derive(Clone)]
pub enum ChainProviders {
    Solana {
        fundamentals: DynProvider<Fundamentals>,
        security: DynProvider<SecurityReport>,
    },
    BnbChain {
        fundamentals: DynProvider<Fundamentals>,
    },
}

impl ChainProviders {
    pub fn fundamentals(&self) -> &DynProvider<Fundamentals> {
        match self {
            Self::Solana { fundamentals, .. } | Self::BnbChain { fundamentals } => fundamentals,
        }
    }

    /// `None` when the chain has no security provider at all
    pub fn security(&self) -> Option<&DynProvider<SecurityReport>> {
        match self {
            Self::Solana { security, .. } => Some(security),
            Self::BnbChain { .. } => None,
        }
    }
}

/// Full provider table
#[derive(Clone)]
pub struct ProviderRegistry {
    pub market: DynProvider<MarketQuote>,
    pub holders: DynProvider<u64>,
    solana: ChainProviders,
    bnb: ChainProviders,
    timeout: Duration,
}

impl ProviderRegistry {
    pub fn new(
        market: DynProvider<MarketQuote>,
        holders: DynProvider<u64>,
        solana: ChainProviders,
        bnb: ChainProviders,
    ) -> Self {
        Self {
            market,
            holders,
            solana,
            bnb,
            timeout: Duration::from_secs(PROVIDER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn for_chain(&self, chain: ChainFamily) -> &ChainProviders {
        match chain {
            ChainFamily::Solana => &self.solana,
            ChainFamily::BnbChain => &self.bnb,
        }
    }
}
