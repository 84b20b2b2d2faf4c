//! ETH/Base alpha hunter.
//!
//! Sources gather market observations (cross-venue prices, TVL deltas, whale
//! moves, liquidation risk, gas), the scorer turns them into ranked
//! opportunities, and the console report or HTTP API presents them.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod sources;

pub use config::{Config, Thresholds};
pub use error::{ConfigError, ScoreError, SourceError};
pub use models::{Observation, Opportunity, OpportunityKind};
pub use services::{score_and_rank, score_and_rank_at};
