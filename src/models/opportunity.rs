use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityKind {
    CrossChainArbitrage,
    WhaleSignal,
    LiquidationCascade,
    EcosystemPlay,
    LowGasOpportunity,
    HighGasMigration,
}

impl OpportunityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityKind::CrossChainArbitrage => "CROSS_CHAIN_ARBITRAGE",
            OpportunityKind::WhaleSignal => "WHALE_SIGNAL",
            OpportunityKind::LiquidationCascade => "LIQUIDATION_CASCADE",
            OpportunityKind::EcosystemPlay => "ECOSYSTEM_PLAY",
            OpportunityKind::LowGasOpportunity => "LOW_GAS_OPPORTUNITY",
            OpportunityKind::HighGasMigration => "HIGH_GAS_MIGRATION",
        }
    }

    /// Case-insensitive parse of the serialized name, for query filters.
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.to_uppercase();
        [
            OpportunityKind::CrossChainArbitrage,
            OpportunityKind::WhaleSignal,
            OpportunityKind::LiquidationCascade,
            OpportunityKind::EcosystemPlay,
            OpportunityKind::LowGasOpportunity,
            OpportunityKind::HighGasMigration,
        ]
        .into_iter()
        .find(|k| k.as_str() == upper)
    }
}

impl std::fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored suggestion. Built fresh per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityKind,
    pub chain: String,
    pub confidence: f64,
    pub profit_potential: f64,
    pub description: String,
    pub action: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Opportunity {
    /// Ranking key.
    pub fn score(&self) -> f64 {
        self.confidence * self.profit_potential
    }

    /// Chain label touches Ethereum, including cross-chain routes.
    pub fn involves_ethereum(&self) -> bool {
        self.chain.contains("Ethereum")
    }

    pub fn involves_base(&self) -> bool {
        self.chain.contains("Base")
    }

    pub fn is_cross_chain(&self) -> bool {
        self.chain.contains('→')
    }
}
