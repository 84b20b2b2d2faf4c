pub mod collector;
pub mod report;
pub mod scorer;
pub mod summary;

pub use collector::{Collection, ObservationCollector};
pub use scorer::{score_and_rank, score_and_rank_at};
pub use summary::DashboardSummary;
