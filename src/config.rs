use serde::Deserialize;
use std::fs;
use std::ops::Deref;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub thresholds: Thresholds,
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub report: ReportConfig,
}

/// Scoring knobs as written in the config file. Turn into [`Thresholds`]
/// to use them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThresholdSettings {
    pub min_arbitrage_bps: f64,
    pub min_whale_amount: f64,
    pub min_liquidation_amount: f64,
    pub liquidation_proximity: f64,
    pub tvl_significance_pct: f64,
    pub low_gas_gwei: f64,
    pub high_gas_gwei: f64,

    pub arbitrage_confidence: f64,
    pub whale_confidence: f64,
    pub whale_profit_potential: f64,
    pub liquidation_confidence: f64,
    pub liquidation_bonus_rate: f64,
    pub liquidation_normalizer_usd: f64,
    pub tvl_profit_factor: f64,
    pub tvl_full_confidence_pct: f64,
    pub low_gas_confidence: f64,
    pub low_gas_profit_potential: f64,
    pub high_gas_confidence: f64,
    pub high_gas_profit_potential: f64,

    pub whale_addresses: Vec<String>,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            min_arbitrage_bps: 8.0,
            min_whale_amount: 1_000_000.0,
            min_liquidation_amount: 500_000.0,
            liquidation_proximity: 0.15,
            tvl_significance_pct: 10.0,
            low_gas_gwei: 20.0,
            high_gas_gwei: 80.0,

            arbitrage_confidence: 0.92,
            whale_confidence: 0.80,
            whale_profit_potential: 0.25,
            liquidation_confidence: 0.85,
            liquidation_bonus_rate: 0.05,
            liquidation_normalizer_usd: 1_000_000.0,
            tvl_profit_factor: 1.0,
            tvl_full_confidence_pct: 100.0,
            low_gas_confidence: 0.91,
            low_gas_profit_potential: 0.15,
            high_gas_confidence: 0.88,
            high_gas_profit_potential: 0.12,

            whale_addresses: vec![
                "0x8eb8a3b98659cce290402893d0123abb75e3ab28".to_string(),
                "0x47ac0fb4f2d84898e4d9e7b4dab3c24507a6d503".to_string(),
                "0x3cd751e6b0078be393132286c442345e5dc49699".to_string(),
                "0x40ec5B33f54e0E8A33A975908C5BA1c14e5BbbDf".to_string(),
            ],
        }
    }
}

/// Validated scoring configuration. Only constructible through
/// [`Thresholds::new`] (or deserialization, which calls it).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(try_from = "ThresholdSettings")]
pub struct Thresholds(ThresholdSettings);

impl Thresholds {
    pub fn new(settings: ThresholdSettings) -> Result<Self, ConfigError> {
        let s = &settings;

        for (name, value) in [
            ("min_arbitrage_bps", s.min_arbitrage_bps),
            ("min_whale_amount", s.min_whale_amount),
            ("min_liquidation_amount", s.min_liquidation_amount),
            ("liquidation_proximity", s.liquidation_proximity),
            ("tvl_significance_pct", s.tvl_significance_pct),
            ("low_gas_gwei", s.low_gas_gwei),
            ("high_gas_gwei", s.high_gas_gwei),
            ("whale_profit_potential", s.whale_profit_potential),
            ("liquidation_bonus_rate", s.liquidation_bonus_rate),
            ("tvl_profit_factor", s.tvl_profit_factor),
            ("low_gas_profit_potential", s.low_gas_profit_potential),
            ("high_gas_profit_potential", s.high_gas_profit_potential),
        ] {
            non_negative(name, value)?;
        }

        for (name, value) in [
            ("arbitrage_confidence", s.arbitrage_confidence),
            ("whale_confidence", s.whale_confidence),
            ("liquidation_confidence", s.liquidation_confidence),
            ("low_gas_confidence", s.low_gas_confidence),
            ("high_gas_confidence", s.high_gas_confidence),
        ] {
            unit_interval(name, value)?;
        }

        for (name, value) in [
            ("liquidation_normalizer_usd", s.liquidation_normalizer_usd),
            ("tvl_full_confidence_pct", s.tvl_full_confidence_pct),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidThreshold { name, value, reason: "must be positive" });
            }
        }

        if s.low_gas_gwei > s.high_gas_gwei {
            return Err(ConfigError::InvalidThreshold {
                name: "low_gas_gwei",
                value: s.low_gas_gwei,
                reason: "must not exceed high_gas_gwei",
            });
        }

        Ok(Self(settings))
    }

    /// Case-insensitive watchlist lookup.
    pub fn is_tracked_whale(&self, address: &str) -> bool {
        self.0.whale_addresses.iter().any(|a| a.eq_ignore_ascii_case(address))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value, reason: "must be a non-negative number" })
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold { name, value, reason: "must be within [0, 1]" })
    }
}

impl TryFrom<ThresholdSettings> for Thresholds {
    type Error = ConfigError;

    fn try_from(settings: ThresholdSettings) -> Result<Self, Self::Error> {
        Thresholds::new(settings)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self(ThresholdSettings::default())
    }
}

impl Deref for Thresholds {
    type Target = ThresholdSettings;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Websocket push interval.
    pub refresh_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            refresh_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    #[default]
    Live,
    Fixture,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub mode: SourceMode,
    /// JSON array of observations; the built-in demo tables are used when unset.
    pub fixture_path: Option<String>,
    pub symbols: Vec<String>,
    /// DexScreener chain ids compared as venue A and venue B.
    pub chains: (String, String),
    pub tvl_floor_usd: f64,
    /// DefiLlama chain filter; empty keeps every chain.
    pub tvl_chains: Vec<String>,
    /// Per HTTP request.
    pub timeout_secs: u64,
    /// Whole-source budget for one collection pass.
    pub collect_timeout_secs: u64,
    pub dexscreener_url: String,
    pub defillama_url: String,
    pub catalog_url: String,
    /// Ethereum JSON-RPC endpoint polled for `eth_gasPrice`.
    pub gas_rpc_url: String,
    /// Whale and liquidation signal tables alongside the live feeds.
    pub signal_tables: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Live,
            fixture_path: None,
            symbols: vec!["USDC".to_string(), "WETH".to_string(), "cbETH".to_string()],
            chains: ("ethereum".to_string(), "base".to_string()),
            tvl_floor_usd: 100_000_000.0,
            tvl_chains: vec!["Ethereum".to_string(), "Base".to_string()],
            timeout_secs: 10,
            collect_timeout_secs: 30,
            dexscreener_url: "https://api.dexscreener.com".to_string(),
            defillama_url: "https://api.llama.fi".to_string(),
            catalog_url: "https://playground.amp.thegraph.com".to_string(),
            gas_rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            signal_tables: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
    /// Notional position used for the estimated-profit figure.
    pub position_usd: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: 8,
            position_usd: 100_000.0,
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Config {} not found, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
