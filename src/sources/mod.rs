pub mod catalog;
pub mod defillama;
pub mod dexscreener;
pub mod fixtures;
pub mod gas;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{SourceMode, SourcesConfig};
use crate::error::SourceResult;
use crate::models::Observation;

pub use crate::error::SourceError;

#[async_trait]
pub trait ObservationSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch_observations(&self) -> SourceResult<Vec<Observation>>;
}

/// Live feeds plus the signal tables for `mode = "live"`, otherwise a
/// single fixture source.
pub fn build_sources(config: &SourcesConfig, force_fixture: bool) -> Vec<Arc<dyn ObservationSource>> {
    if force_fixture || config.mode == SourceMode::Fixture {
        let source = match &config.fixture_path {
            Some(path) if !force_fixture => fixtures::FixtureSource::from_file(path),
            _ => fixtures::FixtureSource::demo(),
        };
        let sources: Vec<Arc<dyn ObservationSource>> = vec![Arc::new(source)];
        return sources;
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let mut sources: Vec<Arc<dyn ObservationSource>> = vec![
        Arc::new(dexscreener::DexScreenerSource::new(
            &config.dexscreener_url,
            config.symbols.clone(),
            config.chains.clone(),
            timeout,
        )),
        Arc::new(defillama::DefiLlamaSource::new(
            &config.defillama_url,
            config.tvl_floor_usd,
            config.tvl_chains.clone(),
            timeout,
        )),
        Arc::new(gas::GasOracleSource::new(&config.gas_rpc_url, "Ethereum", timeout)),
    ];
    if config.signal_tables {
        sources.push(Arc::new(fixtures::FixtureSource::signals()));
    }
    sources
}

/// Shared reqwest client setup for the HTTP sources.
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("alpha-hunter/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// "ethereum" -> "Ethereum"
pub(crate) fn chain_label(chain_id: &str) -> String {
    match chain_id {
        "ethereum" => "Ethereum".to_string(),
        "base" => "Base".to_string(),
        "bsc" => "BSC".to_string(),
        "polygon" => "Polygon".to_string(),
        "arbitrum" => "Arbitrum".to_string(),
        "optimism" => "Optimism".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}
