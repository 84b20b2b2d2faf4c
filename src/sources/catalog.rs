use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{http_client, SourceError};
use crate::error::SourceResult;

const ETHEREUM_MAINNET: &str = "ethereum-mainnet";
const BASE_MAINNET: &str = "base-mainnet";

/// Subgraph-style dataset listing from the AMP playground.
pub struct DatasetCatalog {
    client: Client,
    base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub indexing_chains: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Datasets split by the mainnet they index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChainDatasets {
    pub ethereum: Vec<DatasetInfo>,
    pub base: Vec<DatasetInfo>,
    pub other: usize,
}

impl ChainDatasets {
    pub fn partition(datasets: Vec<DatasetInfo>) -> Self {
        let mut out = ChainDatasets::default();
        for dataset in datasets {
            if dataset.indexing_chains.iter().any(|c| c == ETHEREUM_MAINNET) {
                out.ethereum.push(dataset);
            } else if dataset.indexing_chains.iter().any(|c| c == BASE_MAINNET) {
                out.base.push(dataset);
            } else {
                out.other += 1;
            }
        }
        out
    }

    /// Names of well-known DeFi protocol datasets, at most `limit` per chain.
    pub fn protocol_names(&self, limit: usize) -> (Vec<&str>, Vec<&str>) {
        fn pick<'a>(datasets: &'a [DatasetInfo], keys: &[&str], limit: usize) -> Vec<&'a str> {
            datasets
                .iter()
                .map(|d| d.name.as_str())
                .filter(|name| {
                    let lower = name.to_lowercase();
                    keys.iter().any(|k| lower.contains(k))
                })
                .take(limit)
                .collect()
        }

        (
            pick(&self.ethereum, &["uniswap", "aave", "sushiswap", "compound"], limit),
            pick(&self.base, &["uniswap", "aerodrome", "aave", "defi"], limit),
        )
    }
}

// tRPC batch envelope: [{"result": {"data": {"json": {"datasets": [...]}}}}]
#[derive(Debug, Deserialize)]
struct TrpcItem {
    result: TrpcResult,
}

#[derive(Debug, Deserialize)]
struct TrpcResult {
    data: TrpcData,
}

#[derive(Debug, Deserialize)]
struct TrpcData {
    json: DatasetList,
}

#[derive(Debug, Deserialize)]
struct DatasetList {
    datasets: Vec<DatasetInfo>,
}

impl DatasetCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: http_client(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn list(&self) -> SourceResult<Vec<DatasetInfo>> {
        let url = format!("{}/api/trpc/datasets.list", self.base_url);

        let resp = self.client.get(&url)
            .query(&[
                ("batch", "1"),
                ("input", r#"{"0":{"json":null,"meta":{"values":["undefined"],"v":1}}}"#),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SourceError::Status { status: resp.status().as_u16(), url });
        }

        let mut batch: Vec<TrpcItem> = resp.json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if batch.is_empty() {
            return Err(SourceError::Parse("empty tRPC batch".to_string()));
        }
        Ok(batch.swap_remove(0).result.data.json.datasets)
    }

    pub async fn by_chain(&self) -> SourceResult<ChainDatasets> {
        Ok(ChainDatasets::partition(self.list().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_BODY: &str = r#"[{"result":{"data":{"json":{"datasets":[
        {"name": "uniswap_v3", "namespace": "edgeandnode", "indexing_chains": ["ethereum-mainnet"]},
        {"name": "ethereum_mainnet", "namespace": "edgeandnode", "indexing_chains": ["ethereum-mainnet"], "updated_at": "2025-07-01T00:00:00Z"},
        {"name": "aerodrome", "namespace": "base-team", "indexing_chains": ["base-mainnet"]},
        {"name": "arb_stuff", "namespace": "x", "indexing_chains": ["arbitrum-one"]}
    ]}}}}]"#;

    #[tokio::test]
    async fn test_list_and_partition() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/trpc/datasets.list")
            .match_query(mockito::Matcher::UrlEncoded("batch".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CATALOG_BODY)
            .create_async()
            .await;

        let catalog = DatasetCatalog::new(&server.url(), Duration::from_secs(5));
        let by_chain = catalog.by_chain().await.unwrap();

        assert_eq!(by_chain.ethereum.len(), 2);
        assert_eq!(by_chain.base.len(), 1);
        assert_eq!(by_chain.other, 1);

        let (eth, base) = by_chain.protocol_names(5);
        assert_eq!(eth, vec!["uniswap_v3"]);
        assert_eq!(base, vec!["aerodrome"]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/trpc/datasets.list")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let catalog = DatasetCatalog::new(&server.url(), Duration::from_secs(5));
        assert!(matches!(catalog.list().await, Err(SourceError::Parse(_))));
    }
}
