//! Solana fundamentals provider
//!
//! Two sources, fetched concurrently:
//! 1. Standard JSON-RPC `getAccountInfo` (jsonParsed) on the mint account:
//!    supply, decimals, mint and freeze authority
//! 2. DAS `getAsset` (optional endpoint): name, symbol, links and a price quote
//!
//! Either half may fail on its own; the provider only fails when both do.

use std::collections::HashMap;

use alloy_primitives::U256;
use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::{debug, info};

use super::provider::Provider;
use super::rpc::JsonRpcClient;
use crate::models::{Fundamentals, MintAuthorities, ProviderId, SocialLinks, TokenAddress};

/// SPL Token program
pub const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Token-2022 program
pub const TOKEN_2022_PROGRAM: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

// ============================================
// SOLANA RPC TYPES
// ============================================

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResponse {
    pub value: Option<SolanaAccountInfo>,
}

/// Solana account info
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaAccountInfo {
    pub owner: String,
    pub data: AccountData,
}

/// Account data (base64 when the node cannot parse it)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountData {
    Parsed(ParsedAccountData),
    Raw(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedAccountData {
    pub program: String,
    pub parsed: ParsedMint,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParsedMint {
    #[serde(rename = "type")]
    pub kind: String,
    pub info: MintInfo,
}

/// jsonParsed mint account
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintInfo {
    pub decimals: u8,
    /// Raw supply in base units, as a decimal string
    pub supply: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

// ============================================
// DAS API TYPES
// ============================================

/// DAS asset, trimmed to the fields we read
#[derive(Debug, Clone, Deserialize)]
pub struct DasAsset {
    pub id: String,
    pub content: Option<AssetContent>,
    pub token_info: Option<TokenInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetContent {
    pub metadata: Option<AssetMetadata>,
    pub links: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub price_info: Option<PriceInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceInfo {
    pub price_per_token: f64,
}

impl DasAsset {
    fn metadata(&self) -> Option<&AssetMetadata> {
        self.content.as_ref().and_then(|c| c.metadata.as_ref())
    }

    pub fn name(&self) -> Option<String> {
        self.metadata()
            .and_then(|m| m.name.clone())
            .filter(|n| !n.trim().is_empty())
    }

    pub fn symbol(&self) -> Option<String> {
        self.metadata()
            .and_then(|m| m.symbol.clone())
            .or_else(|| self.token_info.as_ref().and_then(|t| t.symbol.clone()))
            .filter(|s| !s.trim().is_empty())
    }

    pub fn price_usd(&self) -> Option<f64> {
        self.token_info
            .as_ref()
            .and_then(|t| t.price_info.as_ref())
            .map(|p| p.price_per_token)
            .filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn social_links(&self) -> SocialLinks {
        let Some(links) = self.content.as_ref().and_then(|c| c.links.as_ref()) else {
            return SocialLinks::default();
        };
        let link = |key: &str| links.get(key).filter(|v| !v.is_empty()).cloned();
        SocialLinks {
            website: link("external_url").or_else(|| link("website")),
            x: link("twitter").or_else(|| link("x")),
            telegram: link("telegram"),
        }
    }
}

/// Mint fundamentals from a parsed account. `None` for anything that is not a mint.
pub fn mint_fundamentals(account: &SolanaAccountInfo) -> Option<Fundamentals> {
    if account.owner != TOKEN_PROGRAM && account.owner != TOKEN_2022_PROGRAM {
        return None;
    }
    let AccountData::Parsed(parsed) = &account.data else {
        return None;
    };
    if parsed.parsed.kind != "mint" {
        return None;
    }
    let info = &parsed.parsed.info;

    Some(Fundamentals {
        supply: U256::from_str_radix(&info.supply, 10).ok(),
        decimals: Some(info.decimals),
        authorities: Some(MintAuthorities {
            mint_authority: info.mint_authority.clone(),
            freeze_authority: info.freeze_authority.clone(),
        }),
        ..Default::default()
    })
}

/// Solana fundamentals provider
pub struct SolanaFundamentalsProvider {
    rpc: JsonRpcClient,
    das: Option<JsonRpcClient>,
}

impl SolanaFundamentalsProvider {
    pub fn new(rpc: JsonRpcClient, das: Option<JsonRpcClient>) -> Self {
        Self { rpc, das }
    }

    /// Mint account via `getAccountInfo`
    pub async fn get_mint(&self, mint: &str) -> Result<Option<Fundamentals>> {
        let params = serde_json::json!([mint, { "encoding": "jsonParsed" }]);
        let response: Option<AccountInfoResponse> = self.rpc.call("getAccountInfo", params).await?;
        Ok(response
            .and_then(|r| r.value)
            .as_ref()
            .and_then(mint_fundamentals))
    }

    /// Asset via DAS `getAsset`
    pub async fn get_asset(&self, mint: &str) -> Result<Option<DasAsset>> {
        let Some(das) = &self.das else {
            return Ok(None);
        };
        debug!("📊 Getting asset: {}", mint);
        das.call("getAsset", serde_json::json!({ "id": mint })).await
    }
}

#[async_trait]
impl Provider for SolanaFundamentalsProvider {
    type Output = Fundamentals;

    fn id(&self) -> ProviderId {
        ProviderId::SolanaRpc
    }

    async fn fetch(&self, address: &TokenAddress) -> Result<Option<Fundamentals>> {
        let mint = address.as_str();
        let (mint_result, asset_result) = tokio::join!(self.get_mint(mint), self.get_asset(mint));

        let asset = match asset_result {
            Ok(asset) => asset,
            Err(e) => {
                debug!("DAS getAsset failed for {}: {}", mint, e);
                None
            }
        };

        let Some(fundamentals) = combine(mint_result, asset)? else {
            return Ok(None);
        };

        match &fundamentals.authorities {
            Some(auth) => info!(
                "🪙 Solana mint {}: decimals={:?} mint_auth={} freeze_auth={}",
                mint,
                fundamentals.decimals,
                auth.mint_authority.is_some(),
                auth.freeze_authority.is_some()
            ),
            None => info!(
                "🪙 Solana mint {}: decimals={:?}, authorities unknown",
                mint, fundamentals.decimals
            ),
        }
        Ok(Some(fundamentals))
    }
}

/// Merge the two halves. Fails only when the mint read failed and DAS had nothing.
///
/// Without a mint account the authorities stay unknown, never revoked.
pub fn combine(mint: Result<Option<Fundamentals>>, asset: Option<DasAsset>) -> Result<Option<Fundamentals>> {
    let base = match (mint, &asset) {
        (Err(e), None) => return Err(eyre!("getAccountInfo failed: {}", e)),
        (Ok(None), None) => return Ok(None),
        (Ok(Some(f)), _) => f,
        (Ok(None), Some(_)) => Fundamentals::default(),
        (Err(e), Some(_)) => {
            debug!("getAccountInfo failed, using DAS metadata only: {}", e);
            Fundamentals::default()
        }
    };
    Ok(Some(match asset {
        Some(asset) => merge_asset(base, &asset),
        None => base,
    }))
}

fn merge_asset(base: Fundamentals, asset: &DasAsset) -> Fundamentals {
    Fundamentals {
        name: asset.name(),
        symbol: asset.symbol(),
        decimals: base
            .decimals
            .or_else(|| asset.token_info.as_ref().and_then(|t| t.decimals)),
        price_usd: asset.price_usd(),
        socials: asset.social_links(),
        ..base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(owner: &str, mint_authority: &str) -> SolanaAccountInfo {
        serde_json::from_value(serde_json::json!({
            "owner": owner,
            "data": {
                "program": "spl-token",
                "parsed": {
                    "type": "mint",
                    "info": {
                        "decimals": 5,
                        "supply": "88871651908624866",
                        "mintAuthority": mint_authority,
                        "freezeAuthority": null,
                        "isInitialized": true
                    }
                },
                "space": 82
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_mint_fundamentals() {
        let f = mint_fundamentals(&account(TOKEN_PROGRAM, "9AhKqLR67hwapvG8SA2JFXaCshXc9nALJjpKaHZrsbkw")).unwrap();
        assert_eq!(f.decimals, Some(5));
        assert_eq!(f.supply, Some(U256::from(88_871_651_908_624_866u64)));
        let auth = f.authorities.unwrap();
        assert!(auth.mint_authority.is_some());
        assert!(auth.freeze_authority.is_none());
    }

    #[test]
    fn test_non_token_account_is_not_a_mint() {
        assert!(mint_fundamentals(&account("11111111111111111111111111111111", "x")).is_none());

        let raw: SolanaAccountInfo = serde_json::from_value(serde_json::json!({
            "owner": TOKEN_PROGRAM,
            "data": ["AAAA", "base64"]
        }))
        .unwrap();
        assert!(mint_fundamentals(&raw).is_none());
    }

    fn bonk_asset() -> DasAsset {
        serde_json::from_value(serde_json::json!({
            "id": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "content": { "metadata": { "name": "Bonk", "symbol": "Bonk" } },
            "token_info": { "decimals": 5 }
        }))
        .unwrap()
    }

    #[test]
    fn test_failed_mint_read_leaves_authorities_unknown() {
        let merged = combine(Err(eyre!("connection refused")), Some(bonk_asset()))
            .unwrap()
            .unwrap();

        assert_eq!(merged.name.as_deref(), Some("Bonk"));
        assert_eq!(merged.decimals, Some(5));
        assert!(merged.authorities.is_none());
    }

    #[test]
    fn test_mint_read_keeps_authorities_under_das_metadata() {
        let mint = mint_fundamentals(&account(TOKEN_PROGRAM, "9AhKqLR67hwapvG8SA2JFXaCshXc9nALJjpKaHZrsbkw"));
        let merged = combine(Ok(mint), Some(bonk_asset())).unwrap().unwrap();

        let auth = merged.authorities.unwrap();
        assert!(auth.mint_authority.is_some());
        assert!(auth.freeze_authority.is_none());
        assert_eq!(merged.symbol.as_deref(), Some("Bonk"));
    }

    #[test]
    fn test_both_halves_missing() {
        assert!(combine(Err(eyre!("timeout")), None).is_err());
        assert!(combine(Ok(None), None).unwrap().is_none());
    }

    #[test]
    fn test_das_asset_fields() {
        let asset: DasAsset = serde_json::from_value(serde_json::json!({
            "id": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
            "content": {
                "metadata": { "name": "Bonk", "symbol": "Bonk" },
                "links": { "external_url": "https://bonkcoin.com", "image": "https://img" }
            },
            "token_info": { "decimals": 5, "price_info": { "price_per_token": 0.0000231, "currency": "USDC" } }
        }))
        .unwrap();

        assert_eq!(asset.name().as_deref(), Some("Bonk"));
        assert_eq!(asset.price_usd(), Some(0.0000231));
        let links = asset.social_links();
        assert_eq!(links.website.as_deref(), Some("https://bonkcoin.com"));
        assert!(links.x.is_none());
    }
}
