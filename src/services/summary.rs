use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Opportunity;

/// Confidence at or above this counts as "high confidence".
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Aggregate figures for a ranked batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_opportunities: usize,
    pub avg_confidence: f64,
    /// Σ profit_potential × position_usd
    pub est_profit_usd: f64,
    pub position_usd: f64,
    pub high_confidence: usize,
    pub ethereum: usize,
    pub base: usize,
    pub cross_chain: usize,
    pub last_updated: DateTime<Utc>,
}

impl DashboardSummary {
    pub fn from_opportunities(opportunities: &[Opportunity], position_usd: f64) -> Self {
        Self::at(opportunities, position_usd, Utc::now())
    }

    pub fn at(opportunities: &[Opportunity], position_usd: f64, now: DateTime<Utc>) -> Self {
        let total = opportunities.len();
        let avg_confidence = if total == 0 {
            0.0
        } else {
            opportunities.iter().map(|o| o.confidence).sum::<f64>() / total as f64
        };

        Self {
            total_opportunities: total,
            avg_confidence,
            est_profit_usd: opportunities.iter().map(|o| o.profit_potential * position_usd).sum(),
            position_usd,
            high_confidence: opportunities.iter().filter(|o| o.confidence >= HIGH_CONFIDENCE).count(),
            ethereum: opportunities.iter().filter(|o| o.involves_ethereum()).count(),
            base: opportunities.iter().filter(|o| o.involves_base()).count(),
            cross_chain: opportunities.iter().filter(|o| o.is_cross_chain()).count(),
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OpportunityKind;

    fn opp(chain: &str, confidence: f64, profit_potential: f64) -> Opportunity {
        Opportunity {
            kind: OpportunityKind::WhaleSignal,
            chain: chain.to_string(),
            confidence,
            profit_potential,
            description: String::new(),
            action: String::new(),
            data: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_summary_figures() {
        let opps = vec![
            opp("Base→Ethereum", 0.92, 0.0036),
            opp("Base", 0.76, 0.25),
            opp("Ethereum", 0.85, 0.10),
        ];

        let summary = DashboardSummary::from_opportunities(&opps, 100_000.0);

        assert_eq!(summary.total_opportunities, 3);
        assert!((summary.avg_confidence - 0.843333).abs() < 1e-4);
        assert!((summary.est_profit_usd - 35_360.0).abs() < 1e-6);
        assert_eq!(summary.high_confidence, 2);
        assert_eq!(summary.ethereum, 2);
        assert_eq!(summary.base, 2);
        assert_eq!(summary.cross_chain, 1);
    }

    #[test]
    fn test_empty_summary() {
        let summary = DashboardSummary::from_opportunities(&[], 100_000.0);
        assert_eq!(summary.total_opportunities, 0);
        assert_eq!(summary.avg_confidence, 0.0);
        assert_eq!(summary.est_profit_usd, 0.0);
    }
}
