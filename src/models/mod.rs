pub mod observation;
pub mod opportunity;

pub use observation::{GasPrice, LiquidationRisk, Observation, PricePair, TvlDelta, WhaleMove};
pub use opportunity::{Opportunity, OpportunityKind};
