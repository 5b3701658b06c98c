//! Providers Module - External Data Sources
//!
//! Market data (DexScreener), chain fundamentals (Solana RPC + DAS, BSC
//! eth_call), security (RugCheck) and holder counts (Moralis), all behind the
//! `Provider` trait and selected per chain through `ProviderRegistry`.

pub mod bsc;
pub mod dexscreener;
pub mod holders;
pub mod provider;
pub mod rpc;
pub mod security;
pub mod solana;

use std::sync::Arc;

use eyre::Result;
use tracing::info;

use crate::config::ScannerConfig;

pub use bsc::BscFundamentalsProvider;
pub use dexscreener::DexScreenerClient;
pub use holders::MoralisClient;
pub use provider::*;
pub use rpc::JsonRpcClient;
pub use security::RugCheckClient;
pub use solana::SolanaFundamentalsProvider;

impl ProviderRegistry {
    /// Live providers for both chains
    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        let solana_rpc = JsonRpcClient::new(&config.solana_rpc_url)?;
        let solana_das = config
            .solana_das_url
            .as_deref()
            .map(JsonRpcClient::new)
            .transpose()?;
        let bsc_rpc = JsonRpcClient::new(&config.bsc_rpc_url)?;
        let moralis = MoralisClient::new(config.moralis_api_key.clone())?;

        info!("✅ Solana RPC: {}", solana_rpc.masked_url());
        info!("✅ BSC RPC: {}", bsc_rpc.masked_url());
        if solana_das.is_none() {
            info!("ℹ️ SOLANA_DAS_URL not set, Solana metadata comes from market data only");
        }
        if !moralis.has_credential() {
            info!("ℹ️ MORALIS_API_KEY not set, holder counts will be absent");
        }

        let solana = ChainProviders::Solana {
            fundamentals: Arc::new(SolanaFundamentalsProvider::new(solana_rpc, solana_das)),
            security: Arc::new(RugCheckClient::new(&config.rugcheck_url)?),
        };
        let bnb = ChainProviders::BnbChain {
            fundamentals: Arc::new(BscFundamentalsProvider::new(bsc_rpc)),
        };

        Ok(Self::new(
            Arc::new(DexScreenerClient::new(&config.dexscreener_url)?),
            Arc::new(moralis),
            solana,
            bnb,
        )
        .with_timeout(config.provider_timeout))
    }
}
