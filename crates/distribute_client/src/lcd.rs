//! Cosmos LCD implementation of [`LedgerRpc`].
//!
//! Smart queries go to `GET {lcd}/cosmwasm/wasm/v1/contract/{addr}/smart/{b64}`
//! where `b64` is the base64 of the query JSON. The gateway answers
//! `{"data": ...}` on success and `{"code": n, "message": "..."}` on failure.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::provider::LedgerRpc;
use crate::registry::ContractAddress;
use crate::rpc_config::RpcConfig;

/// LCD HTTP client.
#[derive(Debug, Clone)]
pub struct LcdClient {
    base_url: String,
    client: reqwest::Client,
}

impl LcdClient {
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_rpc_config(rpc: &RpcConfig) -> ClientResult<Self> {
        Self::new(&rpc.url, rpc.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the smart-query endpoint for `query` against `address`.
    pub fn smart_query_url(&self, address: &ContractAddress, query: &Value) -> anyhow::Result<String> {
        let raw = serde_json::to_vec(query).context("failed to encode query")?;
        Ok(format!(
            "{}/cosmwasm/wasm/v1/contract/{}/smart/{}",
            self.base_url,
            address,
            URL_SAFE.encode(raw)
        ))
    }
}

/// Pull the contract's answer out of an LCD smart-query body.
fn parse_smart_query_response(body: Value) -> anyhow::Result<Value> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        let code = body.get("code").and_then(Value::as_i64).unwrap_or_default();
        anyhow::bail!("LCD error {code}: {message}");
    }
    match body {
        Value::Object(mut map) => map
            .remove("data")
            .context("LCD response has no `data` field"),
        other => anyhow::bail!("unexpected LCD response: {other}"),
    }
}

#[async_trait]
impl LedgerRpc for LcdClient {
    async fn contract_query(
        &self,
        address: &ContractAddress,
        query: &Value,
    ) -> anyhow::Result<Value> {
        let url = self.smart_query_url(address, query)?;
        debug!(contract = %address, %url, "LCD smart query");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("LCD request failed")?;
        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("LCD returned a non-JSON body ({status})"))?;

        if !status.is_success() {
            warn!(contract = %address, %status, "LCD smart query rejected");
        }
        parse_smart_query_response(body)
    }
}
