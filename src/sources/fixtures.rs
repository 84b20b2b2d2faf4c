use async_trait::async_trait;
use std::path::PathBuf;

use super::ObservationSource;
use crate::error::{SourceError, SourceResult};
use crate::models::{GasPrice, LiquidationRisk, Observation, PricePair, TvlDelta, WhaleMove};

/// Offline data: the built-in demo tables, the whale and liquidation signal
/// tables alone, or a JSON file of observations.
pub struct FixtureSource {
    origin: FixtureOrigin,
}

enum FixtureOrigin {
    Demo,
    Signals,
    File(PathBuf),
}

impl FixtureSource {
    pub fn demo() -> Self {
        Self { origin: FixtureOrigin::Demo }
    }

    /// Whale and liquidation tables only. Runs beside the live feeds, which
    /// carry no whale or lending data.
    pub fn signals() -> Self {
        Self { origin: FixtureOrigin::Signals }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self { origin: FixtureOrigin::File(path.into()) }
    }
}

#[async_trait]
impl ObservationSource for FixtureSource {
    fn name(&self) -> &'static str {
        match self.origin {
            FixtureOrigin::Signals => "SignalTables",
            _ => "Fixtures",
        }
    }

    async fn fetch_observations(&self) -> SourceResult<Vec<Observation>> {
        match &self.origin {
            FixtureOrigin::Demo => Ok(demo_observations()),
            FixtureOrigin::Signals => Ok(signal_observations()),
            FixtureOrigin::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                parse_observations(&content)
            }
        }
    }
}

/// Decodes a JSON array item by item. Items that fail to decode are logged
/// and dropped; the rest of the file still loads.
pub fn parse_observations(content: &str) -> SourceResult<Vec<Observation>> {
    let items: Vec<serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| SourceError::Parse(format!("fixture is not a JSON array: {}", e)))?;

    let mut observations = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Observation>(item) {
            Ok(obs) => observations.push(obs),
            Err(e) => tracing::warn!("Skipping fixture item {}: {}", index, e),
        }
    }
    Ok(observations)
}

/// ETH mainnet + Base demo tables.
pub fn demo_observations() -> Vec<Observation> {
    let mut observations = Vec::new();

    for (symbol, eth_price, base_price, volume) in [
        ("USDC", 1.0008, 0.9995, 150_000_000.0),
        ("WETH", 3456.78, 3461.45, 85_000_000.0),
        ("cbETH", 3678.90, 3672.15, 25_000_000.0),
    ] {
        observations.push(Observation::PricePair(PricePair::new(symbol, eth_price, base_price, volume)));
    }

    observations.extend(signal_observations());

    observations.push(Observation::TvlDelta(TvlDelta::new("Aerodrome Finance", 180_000_000.0, 127.0)));
    observations.push(Observation::TvlDelta(TvlDelta::new("Base Bridge", 45_000_000.0, 61.0)));

    observations.push(Observation::GasPrice(GasPrice {
        chain: "Ethereum".to_string(),
        gwei: 35.0,
    }));

    observations
}

/// Base whale moves and ETH mainnet lending positions near liquidation.
pub fn signal_observations() -> Vec<Observation> {
    let mut observations = Vec::new();

    observations.push(Observation::WhaleMove(WhaleMove {
        address: "0x3cd751e6b0078be393132286c442345e5dc49699".to_string(),
        asset: "USDC".to_string(),
        usd_amount: 15_000_000.0,
        intent: "Preparing for large Base ecosystem buy".to_string(),
        chain: "Base".to_string(),
        confidence: Some(0.89),
    }));
    observations.push(Observation::WhaleMove(WhaleMove {
        address: "0x40ec5B33f54e0E8A33A975908C5BA1c14e5BbbDf".to_string(),
        asset: "AERO".to_string(),
        usd_amount: 3_200_000.0,
        intent: "Governance play or major announcement coming".to_string(),
        chain: "Base".to_string(),
        confidence: Some(0.76),
    }));

    for (protocol, at_risk, trigger, positions, bonus) in [
        ("Aave V2", 125_000_000.0, 3200.0, 847, 0.08),
        ("Compound V2", 89_000_000.0, 3150.0, 623, 0.05),
    ] {
        let mut risk = LiquidationRisk::new(protocol, at_risk, trigger, 3456.0);
        risk.positions = Some(positions);
        risk.liquidation_bonus = Some(bonus);
        observations.push(Observation::LiquidationRisk(risk));
    }

    observations
}
