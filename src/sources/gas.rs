use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, ObservationSource, SourceError};
use crate::error::SourceResult;
use crate::models::{GasPrice, Observation};

/// Current gas price from an Ethereum JSON-RPC endpoint (`eth_gasPrice`).
pub struct GasOracleSource {
    client: Client,
    rpc_url: String,
    chain: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<serde_json::Value>,
}

impl GasOracleSource {
    pub fn new(rpc_url: &str, chain: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            rpc_url: rpc_url.to_string(),
            chain: chain.to_string(),
        }
    }
}

/// "0x174876e800" -> 100.0 gwei
fn wei_hex_to_gwei(hex: &str) -> Result<f64, SourceError> {
    let digits = hex.trim_start_matches("0x");
    let wei = u128::from_str_radix(digits, 16)
        .map_err(|e| SourceError::Parse(format!("gas price {:?}: {}", hex, e)))?;
    Ok(wei as f64 / 1e9)
}

#[async_trait]
impl ObservationSource for GasOracleSource {
    fn name(&self) -> &'static str {
        "GasOracle"
    }

    async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "eth_gasPrice",
            "params": [],
            "id": 1
        });

        let resp = self.client.post(&self.rpc_url).json(&payload).send().await?;

        if resp.status() == 429 {
            return Err(SourceError::RateLimit);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status {
                status: resp.status().as_u16(),
                url: self.rpc_url.clone(),
            });
        }

        let body: RpcResponse = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(SourceError::Parse(format!("RPC error: {}", err)));
        }
        let result = body
            .result
            .ok_or_else(|| SourceError::Parse("no result in RPC response".to_string()))?;

        let gwei = wei_hex_to_gwei(&result)?;
        tracing::debug!("{} gas price: {:.2} gwei", self.chain, gwei);

        Ok(vec![Observation::GasPrice(GasPrice {
            chain: self.chain.clone(),
            gwei,
        })])
    }
}
