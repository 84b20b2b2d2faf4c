use chrono::{DateTime, Utc};
use serde_json::json;

use crate::config::Thresholds;
use crate::error::ScoreError;
use crate::models::{
    GasPrice, LiquidationRisk, Observation, Opportunity, OpportunityKind, PricePair, TvlDelta,
    WhaleMove,
};

/// Scores every observation and returns the emitted opportunities ranked by
/// `confidence * profit_potential`, highest first.
pub fn score_and_rank(observations: &[Observation], thresholds: &Thresholds) -> Vec<Opportunity> {
    score_and_rank_at(observations, thresholds, Utc::now())
}

/// [`score_and_rank`] with an explicit creation timestamp. Output is a pure
/// function of the arguments.
pub fn score_and_rank_at(
    observations: &[Observation],
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = observations
        .iter()
        .filter_map(|obs| match score_observation(obs, thresholds, now) {
            Ok(opportunity) => opportunity,
            Err(e) => {
                tracing::debug!("Skipping observation: {}", e);
                None
            }
        })
        .collect();

    rank(&mut opportunities);
    opportunities
}

/// Stable, descending by score. Equal scores keep their input order.
pub fn rank(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| b.score().total_cmp(&a.score()));
}

/// `Ok(None)` when the observation is well formed but below its threshold.
pub fn score_observation(
    observation: &Observation,
    thresholds: &Thresholds,
    now: DateTime<Utc>,
) -> Result<Option<Opportunity>, ScoreError> {
    let kind = observation.kind_name();
    let scored = match observation {
        Observation::PricePair(p) => score_price_pair(kind, p, thresholds)?,
        Observation::WhaleMove(w) => score_whale_move(kind, w, thresholds)?,
        Observation::LiquidationRisk(r) => score_liquidation(kind, r, thresholds)?,
        Observation::TvlDelta(t) => score_tvl_delta(kind, t, thresholds)?,
        Observation::GasPrice(g) => score_gas(kind, g, thresholds)?,
    };

    if let Some(s) = &scored {
        require_finite(kind, "profit_potential", s.profit_potential)?;
    }

    Ok(scored.map(|s| Opportunity {
        kind: s.kind,
        chain: s.chain,
        confidence: s.confidence.clamp(0.0, 1.0),
        profit_potential: s.profit_potential.max(0.0),
        description: s.description,
        action: s.action,
        data: s.data,
        timestamp: now,
    }))
}

struct Scored {
    kind: OpportunityKind,
    chain: String,
    confidence: f64,
    profit_potential: f64,
    description: String,
    action: String,
    data: serde_json::Value,
}

fn score_price_pair(
    kind: &'static str,
    p: &PricePair,
    t: &Thresholds,
) -> Result<Option<Scored>, ScoreError> {
    require_text(kind, "symbol", &p.symbol)?;
    require_positive(kind, "price_a", p.price_a)?;
    require_positive(kind, "price_b", p.price_b)?;
    require_non_negative(kind, "volume", p.volume)?;

    let spread_bps = (p.price_a - p.price_b).abs() / p.price_a.min(p.price_b) * 10_000.0;
    require_finite(kind, "spread_bps", spread_bps)?;
    if spread_bps <= t.min_arbitrage_bps {
        return Ok(None);
    }

    let (buy, sell) = if p.price_a > p.price_b {
        (&p.venue_b, &p.venue_a)
    } else {
        (&p.venue_a, &p.venue_b)
    };

    Ok(Some(Scored {
        kind: OpportunityKind::CrossChainArbitrage,
        chain: format!("{}→{}", buy, sell),
        confidence: t.arbitrage_confidence,
        profit_potential: spread_bps / 10_000.0,
        description: format!("{} arbitrage: {:.1}bps spread ({}→{})", p.symbol, spread_bps, buy, sell),
        action: format!("Buy {} on {}, sell on {}", p.symbol, buy, sell),
        data: json!({
            "token": p.symbol,
            "price_a": p.price_a,
            "price_b": p.price_b,
            "profit_bps": spread_bps,
            "volume": p.volume,
        }),
    }))
}

fn score_whale_move(
    kind: &'static str,
    w: &WhaleMove,
    t: &Thresholds,
) -> Result<Option<Scored>, ScoreError> {
    require_text(kind, "address", &w.address)?;
    require_text(kind, "asset", &w.asset)?;
    require_non_negative(kind, "usd_amount", w.usd_amount)?;
    if let Some(c) = w.confidence {
        if !(0.0..=1.0).contains(&c) {
            return Err(ScoreError::malformed(kind, format!("confidence {} outside [0, 1]", c)));
        }
    }

    if w.usd_amount <= t.min_whale_amount {
        return Ok(None);
    }

    let label = if t.is_tracked_whale(&w.address) { "tracked whale" } else { "whale" };

    Ok(Some(Scored {
        kind: OpportunityKind::WhaleSignal,
        chain: w.chain.clone(),
        confidence: w.confidence.unwrap_or(t.whale_confidence),
        profit_potential: t.whale_profit_potential,
        description: format!(
            "${} {} move by {} on {}",
            thousands(w.usd_amount),
            w.asset,
            label,
            w.chain
        ),
        action: format!("FOLLOW: {}", w.intent),
        data: serde_json::to_value(w).unwrap_or_default(),
    }))
}

fn score_liquidation(
    kind: &'static str,
    r: &LiquidationRisk,
    t: &Thresholds,
) -> Result<Option<Scored>, ScoreError> {
    require_text(kind, "protocol", &r.protocol)?;
    require_non_negative(kind, "collateral_at_risk", r.collateral_at_risk)?;
    require_positive(kind, "trigger_price", r.trigger_price)?;
    require_positive(kind, "current_price", r.current_price)?;
    if let Some(bonus) = r.liquidation_bonus {
        if !(0.0..=1.0).contains(&bonus) {
            return Err(ScoreError::malformed(kind, format!("liquidation_bonus {} outside [0, 1]", bonus)));
        }
    }

    if r.distance_to_trigger() >= t.liquidation_proximity
        || r.collateral_at_risk < t.min_liquidation_amount
    {
        return Ok(None);
    }

    let bonus = r.liquidation_bonus.unwrap_or(t.liquidation_bonus_rate);
    let liquidation_profit = r.collateral_at_risk * bonus;

    Ok(Some(Scored {
        kind: OpportunityKind::LiquidationCascade,
        chain: r.chain.clone(),
        confidence: t.liquidation_confidence,
        profit_potential: liquidation_profit / t.liquidation_normalizer_usd,
        description: format!(
            "${} at risk in {} if price hits ${}",
            thousands(r.collateral_at_risk),
            r.protocol,
            thousands(r.trigger_price)
        ),
        action: format!("PREPARE: ${} liquidation profit potential", thousands(liquidation_profit)),
        data: serde_json::to_value(r).unwrap_or_default(),
    }))
}

fn score_tvl_delta(
    kind: &'static str,
    d: &TvlDelta,
    t: &Thresholds,
) -> Result<Option<Scored>, ScoreError> {
    require_text(kind, "protocol", &d.protocol)?;
    require_non_negative(kind, "tvl", d.tvl)?;
    require_finite(kind, "change_1d", d.change_1d)?;

    let magnitude = d.change_1d.abs();
    if magnitude <= t.tvl_significance_pct {
        return Ok(None);
    }

    let (verb, action) = if d.change_1d > 0.0 {
        ("growing", format!("BUY: {} ecosystem exposure", d.protocol))
    } else {
        ("draining", format!("WATCH: {} outflows, reduce exposure", d.protocol))
    };

    Ok(Some(Scored {
        kind: OpportunityKind::EcosystemPlay,
        chain: d.chain.clone(),
        confidence: (magnitude / t.tvl_full_confidence_pct).min(1.0),
        profit_potential: magnitude / 100.0 * t.tvl_profit_factor,
        description: format!(
            "{} TVL {} {:+.1}% in 24h (${} locked)",
            d.protocol,
            verb,
            d.change_1d,
            thousands(d.tvl)
        ),
        action,
        data: serde_json::to_value(d).unwrap_or_default(),
    }))
}

fn score_gas(
    kind: &'static str,
    g: &GasPrice,
    t: &Thresholds,
) -> Result<Option<Scored>, ScoreError> {
    require_text(kind, "chain", &g.chain)?;
    require_non_negative(kind, "gwei", g.gwei)?;

    let data = json!({ "gas_gwei": g.gwei, "chain": g.chain });

    if g.gwei < t.low_gas_gwei {
        Ok(Some(Scored {
            kind: OpportunityKind::LowGasOpportunity,
            chain: g.chain.clone(),
            confidence: t.low_gas_confidence,
            profit_potential: t.low_gas_profit_potential,
            description: format!("Gas at {} gwei, profitable for complex arbitrage", g.gwei),
            action: "EXECUTE: Multi-hop arbitrage while gas is cheap".to_string(),
            data,
        }))
    } else if g.gwei > t.high_gas_gwei {
        Ok(Some(Scored {
            kind: OpportunityKind::HighGasMigration,
            chain: "Base".to_string(),
            confidence: t.high_gas_confidence,
            profit_potential: t.high_gas_profit_potential,
            description: format!("{} gas at {} gwei, users migrating to Base", g.chain, g.gwei),
            action: "BUY: Base ecosystem tokens, expect volume surge".to_string(),
            data,
        }))
    } else {
        Ok(None)
    }
}

fn require_text(kind: &'static str, field: &str, value: &str) -> Result<(), ScoreError> {
    if value.trim().is_empty() {
        return Err(ScoreError::malformed(kind, format!("{} is empty", field)));
    }
    Ok(())
}

fn require_finite(kind: &'static str, field: &str, value: f64) -> Result<(), ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::malformed(kind, format!("{} is not a number", field)));
    }
    Ok(())
}

fn require_positive(kind: &'static str, field: &str, value: f64) -> Result<(), ScoreError> {
    require_finite(kind, field, value)?;
    if value <= 0.0 {
        return Err(ScoreError::malformed(kind, format!("{} must be positive, got {}", field, value)));
    }
    Ok(())
}

fn require_non_negative(kind: &'static str, field: &str, value: f64) -> Result<(), ScoreError> {
    require_finite(kind, field, value)?;
    if value < 0.0 {
        return Err(ScoreError::malformed(kind, format!("{} is negative: {}", field, value)));
    }
    Ok(())
}

/// 15000000.0 -> "15,000,000"
fn thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}
