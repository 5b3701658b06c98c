//! BNB Chain fundamentals provider
//!
//! One JSON-RPC batch of four ERC-20 `eth_call`s: name, symbol, decimals,
//! totalSupply. Each call decodes independently; a token that reverts on
//! `name()` still reports its supply.

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;
use eyre::{eyre, Result};
use tracing::{debug, info};

use super::provider::Provider;
use super::rpc::JsonRpcClient;
use crate::models::{Fundamentals, ProviderId, TokenAddress};

sol! {
    function name() external view returns (string);
    function symbol() external view returns (string);
    function decimals() external view returns (uint8);
    function totalSupply() external view returns (uint256);
}

/// BSC ERC-20 metadata provider
pub struct BscFundamentalsProvider {
    rpc: JsonRpcClient,
}

fn call_params(to: &str, calldata: Vec<u8>) -> serde_json::Value {
    serde_json::json!([
        { "to": to, "data": format!("0x{}", hex::encode(calldata)) },
        "latest"
    ])
}

fn return_bytes(raw: &str) -> Option<Vec<u8>> {
    let bytes = hex::decode(raw.trim_start_matches("0x")).ok()?;
    (!bytes.is_empty()).then_some(bytes)
}

fn decode_string<C: SolCall>(raw: &str, pick: impl Fn(C::Return) -> String) -> Option<String> {
    let bytes = return_bytes(raw)?;
    let value = pick(C::abi_decode_returns(&bytes, true).ok()?);
    let value = value.trim_matches(char::from(0)).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Decode the four batch replies (request order: name, symbol, decimals, totalSupply)
pub fn decode_metadata(replies: &[Result<String>]) -> Fundamentals {
    let reply = |idx: usize| replies.get(idx).and_then(|r| r.as_ref().ok());

    Fundamentals {
        name: reply(0).and_then(|r| decode_string::<nameCall>(r, |ret| ret._0)),
        symbol: reply(1).and_then(|r| decode_string::<symbolCall>(r, |ret| ret._0)),
        decimals: reply(2)
            .and_then(|r| return_bytes(r))
            .and_then(|b| decimalsCall::abi_decode_returns(&b, true).ok())
            .map(|ret| ret._0),
        supply: reply(3)
            .and_then(|r| return_bytes(r))
            .and_then(|b| totalSupplyCall::abi_decode_returns(&b, true).ok())
            .map(|ret| ret._0),
        ..Default::default()
    }
}

impl BscFundamentalsProvider {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl Provider for BscFundamentalsProvider {
    type Output = Fundamentals;

    fn id(&self) -> ProviderId {
        ProviderId::BscRpc
    }

    async fn fetch(&self, address: &TokenAddress) -> Result<Option<Fundamentals>> {
        let to = address.as_str();
        let requests = [
            ("eth_call", call_params(to, nameCall {}.abi_encode())),
            ("eth_call", call_params(to, symbolCall {}.abi_encode())),
            ("eth_call", call_params(to, decimalsCall {}.abi_encode())),
            ("eth_call", call_params(to, totalSupplyCall {}.abi_encode())),
        ];

        let replies: Vec<Result<String>> = self
            .rpc
            .batch_call(&requests)
            .await
            .map_err(|e| eyre!("BSC batch eth_call failed: {}", e))?;

        for (idx, reply) in replies.iter().enumerate() {
            if let Err(e) = reply {
                debug!("eth_call #{} on {} failed: {}", idx, to, e);
            }
        }

        let fundamentals = decode_metadata(&replies);
        if fundamentals.supply.is_none() && fundamentals.decimals.is_none() && fundamentals.name.is_none() {
            // Not an ERC-20 (EOA or unrelated contract)
            return Ok(None);
        }

        info!(
            "🪙 BSC token {}: {:?} decimals={:?} supply={}",
            to,
            fundamentals.symbol,
            fundamentals.decimals,
            fundamentals.supply.unwrap_or(U256::ZERO)
        );
        Ok(Some(fundamentals))
    }
}
