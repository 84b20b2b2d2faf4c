use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{http_client, ObservationSource, SourceError};
use crate::error::SourceResult;
use crate::models::{Observation, TvlDelta};

/// DefiLlama protocol list, reduced to TVL deltas above a floor.
pub struct DefiLlamaSource {
    client: Client,
    base_url: String,
    tvl_floor_usd: f64,
    chains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LlamaProtocol {
    name: Option<String>,
    tvl: Option<f64>,
    change_1d: Option<f64>,
    chain: Option<String>,
    #[serde(default)]
    chains: Vec<String>,
}

impl DefiLlamaSource {
    pub fn new(base_url: &str, tvl_floor_usd: f64, chains: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            tvl_floor_usd,
            chains,
        }
    }

    fn to_delta(&self, protocol: LlamaProtocol) -> Option<TvlDelta> {
        let name = protocol.name?;
        let tvl = protocol.tvl?;
        let change_1d = protocol.change_1d?;

        if tvl < self.tvl_floor_usd {
            return None;
        }

        let chain = if self.chains.is_empty() {
            protocol.chain.unwrap_or_else(|| "Multi-Chain".to_string())
        } else {
            // first configured chain the protocol is deployed on
            self.chains
                .iter()
                .find(|wanted| {
                    protocol.chain.as_deref() == Some(wanted.as_str())
                        || protocol.chains.iter().any(|c| c == *wanted)
                })?
                .clone()
        };

        Some(TvlDelta {
            protocol: name,
            tvl,
            change_1d,
            chain,
        })
    }
}

#[async_trait]
impl ObservationSource for DefiLlamaSource {
    fn name(&self) -> &'static str {
        "DefiLlama"
    }

    async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
        let url = format!("{}/protocols", self.base_url);

        let resp = self.client.get(&url).send().await?;

        if resp.status() == 429 {
            return Err(SourceError::RateLimit);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status { status: resp.status().as_u16(), url });
        }

        let protocols: Vec<LlamaProtocol> = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let total = protocols.len();
        let observations: Vec<Observation> = protocols
            .into_iter()
            .filter_map(|p| self.to_delta(p))
            .map(Observation::TvlDelta)
            .collect();

        tracing::debug!("DefiLlama: {} of {} protocols above floor", observations.len(), total);
        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROTOCOLS_BODY: &str = r#"[
        {"name": "Aave V3", "tvl": 12000000000, "change_1d": -2.1, "chain": "Multi-Chain", "chains": ["Ethereum", "Base"]},
        {"name": "Aerodrome", "tvl": 600000000, "change_1d": 61.0, "chain": "Base", "chains": ["Base"]},
        {"name": "Tiny", "tvl": 5000000, "change_1d": 300.0, "chain": "Base", "chains": ["Base"]},
        {"name": "NoChange", "tvl": 900000000, "change_1d": null, "chain": "Ethereum", "chains": ["Ethereum"]},
        {"name": "Solana Thing", "tvl": 800000000, "change_1d": 20.0, "chain": "Solana", "chains": ["Solana"]}
    ]"#;

    fn source(url: &str) -> DefiLlamaSource {
        DefiLlamaSource::new(
            url,
            100_000_000.0,
            vec!["Ethereum".to_string(), "Base".to_string()],
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_fetch_filters_floor_chain_and_missing_change() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/protocols")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PROTOCOLS_BODY)
            .create_async()
            .await;

        let observations = source(&server.url()).fetch_observations().await.unwrap();

        let deltas: Vec<&TvlDelta> = observations
            .iter()
            .filter_map(|o| match o {
                Observation::TvlDelta(d) => Some(d),
                _ => None,
            })
            .collect();

        assert_eq!(deltas.len(), 2);
        assert_eq!(deltas[0].protocol, "Aave V3");
        assert_eq!(deltas[0].chain, "Ethereum");
        assert_eq!(deltas[1].protocol, "Aerodrome");
        assert_eq!(deltas[1].chain, "Base");
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/protocols").with_status(503).create_async().await;

        let result = source(&server.url()).fetch_observations().await;
        assert!(matches!(result, Err(SourceError::Status { status: 503, .. })));
    }
}
