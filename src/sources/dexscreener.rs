use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{chain_label, http_client, ObservationSource, SourceError};
use crate::error::SourceResult;
use crate::models::{Observation, PricePair};

/// Cross-venue price feed: the same token quoted on two chains.
pub struct DexScreenerSource {
    client: Client,
    base_url: String,
    symbols: Vec<String>,
    chains: (String, String),
}

#[derive(Debug, Deserialize)]
struct DexScreenerResponse {
    pairs: Option<Vec<DexScreenerPair>>,
}

#[derive(Debug, Deserialize)]
struct DexScreenerPair {
    #[serde(rename = "chainId")]
    chain_id: Option<String>,
    #[serde(rename = "baseToken")]
    base_token: Option<DexScreenerToken>,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    volume: Option<DexScreenerVolume>,
}

#[derive(Debug, Deserialize)]
struct DexScreenerToken {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DexScreenerVolume {
    h24: Option<f64>,
}

/// First valid price seen on a chain plus the chain's summed 24h volume.
#[derive(Debug, Default, Clone, Copy)]
struct ChainQuote {
    price: Option<f64>,
    volume: f64,
}

impl DexScreenerSource {
    pub fn new(base_url: &str, symbols: Vec<String>, chains: (String, String), timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            symbols,
            chains,
        }
    }

    async fn fetch_symbol(&self, symbol: &str) -> SourceResult<Option<PricePair>> {
        let url = format!("{}/latest/dex/search", self.base_url);

        let resp = self.client.get(&url)
            .query(&[("q", symbol)])
            .header("Accept", "application/json")
            .send()
            .await?;

        if resp.status() == 429 {
            return Err(SourceError::RateLimit);
        }
        if !resp.status().is_success() {
            return Err(SourceError::Status { status: resp.status().as_u16(), url });
        }

        let data: DexScreenerResponse = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(self.pair_from_response(symbol, data))
    }

    fn pair_from_response(&self, symbol: &str, data: DexScreenerResponse) -> Option<PricePair> {
        let mut quotes: HashMap<String, ChainQuote> = HashMap::new();

        for pair in data.pairs.unwrap_or_default() {
            let base_symbol = pair.base_token
                .as_ref()
                .and_then(|t| t.symbol.as_deref())
                .unwrap_or("");
            // exact symbol match only
            if !base_symbol.eq_ignore_ascii_case(symbol) {
                continue;
            }

            let Some(chain) = pair.chain_id else { continue };
            let quote = quotes.entry(chain).or_default();
            quote.volume += pair.volume.and_then(|v| v.h24).unwrap_or(0.0);

            if quote.price.is_none() {
                quote.price = pair.price_usd
                    .as_deref()
                    .and_then(|p| p.parse::<f64>().ok())
                    .filter(|p| *p > 0.0 && *p < 1_000_000_000.0);
            }
        }

        let (chain_a, chain_b) = &self.chains;
        let a = quotes.get(chain_a).copied().unwrap_or_default();
        let b = quotes.get(chain_b).copied().unwrap_or_default();

        match (a.price, b.price) {
            (Some(price_a), Some(price_b)) => Some(
                PricePair::new(symbol, price_a, price_b, a.volume + b.volume)
                    .with_venues(&chain_label(chain_a), &chain_label(chain_b)),
            ),
            _ => {
                tracing::debug!("{} not quoted on both {} and {}", symbol, chain_a, chain_b);
                None
            }
        }
    }
}

#[async_trait]
impl ObservationSource for DexScreenerSource {
    fn name(&self) -> &'static str {
        "DexScreener"
    }

    async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
        let mut observations = Vec::new();
        let mut last_error = None;

        for symbol in &self.symbols {
            match self.fetch_symbol(symbol).await {
                Ok(Some(pair)) => observations.push(Observation::PricePair(pair)),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("DexScreener error for {}: {}", symbol, e);
                    last_error = Some(e);
                }
            }
            // stay under the public rate limit
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        // Only a total failure counts as the source being unavailable.
        match last_error {
            Some(e) if observations.is_empty() => Err(e),
            _ => Ok(observations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BODY: &str = r#"{
        "pairs": [
            {"chainId": "ethereum", "baseToken": {"symbol": "USDC"}, "priceUsd": "1.0023", "volume": {"h24": 1500000}},
            {"chainId": "ethereum", "baseToken": {"symbol": "USDC"}, "priceUsd": "1.0100", "volume": {"h24": 100000}},
            {"chainId": "base", "baseToken": {"symbol": "usdc"}, "priceUsd": "0.9987", "volume": {"h24": 500000}},
            {"chainId": "base", "baseToken": {"symbol": "USDbC"}, "priceUsd": "0.5000"},
            {"chainId": "polygon", "baseToken": {"symbol": "USDC"}, "priceUsd": "1.0"}
        ]
    }"#;

    fn source(url: &str, symbols: &[&str]) -> DexScreenerSource {
        DexScreenerSource::new(
            url,
            symbols.iter().map(|s| s.to_string()).collect(),
            ("ethereum".to_string(), "base".to_string()),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_pair_from_response_uses_first_price_per_chain() {
        let data: DexScreenerResponse = serde_json::from_str(SEARCH_BODY).unwrap();
        let pair = source("http://unused", &[]).pair_from_response("USDC", data).unwrap();

        assert_eq!(pair.price_a, 1.0023);
        assert_eq!(pair.price_b, 0.9987);
        assert_eq!(pair.volume, 2_100_000.0);
        assert_eq!(pair.venue_a, "Ethereum");
        assert_eq!(pair.venue_b, "Base");
    }

    #[test]
    fn test_single_venue_yields_nothing() {
        let data: DexScreenerResponse = serde_json::from_str(
            r#"{"pairs": [{"chainId": "ethereum", "baseToken": {"symbol": "AERO"}, "priceUsd": "1.2"}]}"#,
        )
        .unwrap();
        assert!(source("http://unused", &[]).pair_from_response("AERO", data).is_none());
    }

    #[tokio::test]
    async fn test_fetch_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/latest/dex/search")
            .match_query(mockito::Matcher::UrlEncoded("q".into(), "USDC".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SEARCH_BODY)
            .create_async()
            .await;

        let observations = source(&server.url(), &["USDC"]).fetch_observations().await.unwrap();

        mock.assert_async().await;
        assert_eq!(observations.len(), 1);
        assert!(matches!(&observations[0], Observation::PricePair(p) if p.symbol == "USDC"));
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_when_nothing_collected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/latest/dex/search")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let result = source(&server.url(), &["USDC"]).fetch_observations().await;
        assert!(matches!(result, Err(SourceError::RateLimit)));
    }
}
