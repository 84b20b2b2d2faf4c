use serde::{Deserialize, Serialize};

/// A raw market observation, normalized by a source before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    PricePair(PricePair),
    WhaleMove(WhaleMove),
    LiquidationRisk(LiquidationRisk),
    TvlDelta(TvlDelta),
    GasPrice(GasPrice),
}

impl Observation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Observation::PricePair(_) => "price_pair",
            Observation::WhaleMove(_) => "whale_move",
            Observation::LiquidationRisk(_) => "liquidation_risk",
            Observation::TvlDelta(_) => "tvl_delta",
            Observation::GasPrice(_) => "gas_price",
        }
    }
}

/// Same asset quoted on two venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePair {
    pub symbol: String,
    pub price_a: f64,
    pub price_b: f64,
    pub volume: f64,
    #[serde(default = "default_venue_a")]
    pub venue_a: String,
    #[serde(default = "default_venue_b")]
    pub venue_b: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleMove {
    pub address: String,
    pub asset: String,
    pub usd_amount: f64,
    pub intent: String,
    #[serde(default = "default_venue_b")]
    pub chain: String,
    /// Caller's own estimate; the configured default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidationRisk {
    pub protocol: String,
    pub collateral_at_risk: f64,
    pub trigger_price: f64,
    pub current_price: f64,
    #[serde(default = "default_venue_a")]
    pub chain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidation_bonus: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlDelta {
    pub protocol: String,
    pub tvl: f64,
    /// Percent, e.g. 61.0 for +61%.
    pub change_1d: f64,
    #[serde(default = "default_venue_b")]
    pub chain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub chain: String,
    pub gwei: f64,
}

fn default_venue_a() -> String { "Ethereum".to_string() }
fn default_venue_b() -> String { "Base".to_string() }

impl PricePair {
    pub fn new(symbol: &str, price_a: f64, price_b: f64, volume: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            price_a,
            price_b,
            volume,
            venue_a: default_venue_a(),
            venue_b: default_venue_b(),
        }
    }

    pub fn with_venues(mut self, venue_a: &str, venue_b: &str) -> Self {
        self.venue_a = venue_a.to_string();
        self.venue_b = venue_b.to_string();
        self
    }
}

impl LiquidationRisk {
    pub fn new(protocol: &str, collateral_at_risk: f64, trigger_price: f64, current_price: f64) -> Self {
        Self {
            protocol: protocol.to_string(),
            collateral_at_risk,
            trigger_price,
            current_price,
            chain: default_venue_a(),
            positions: None,
            liquidation_bonus: None,
        }
    }

    /// Fractional distance of the current price above the trigger.
    pub fn distance_to_trigger(&self) -> f64 {
        (self.current_price - self.trigger_price) / self.current_price
    }
}

impl TvlDelta {
    pub fn new(protocol: &str, tvl: f64, change_1d: f64) -> Self {
        Self {
            protocol: protocol.to_string(),
            tvl,
            change_1d,
            chain: default_venue_b(),
        }
    }
}
