use alpha_hunter::models::{GasPrice, LiquidationRisk, PricePair, TvlDelta, WhaleMove};
use alpha_hunter::{score_and_rank_at, Observation, OpportunityKind, Thresholds};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn price_pair() -> impl Strategy<Value = Observation> {
    (0.5f64..5000.0, -0.02f64..0.02, 0.0f64..1e9).prop_map(|(price, drift, volume)| {
        Observation::PricePair(PricePair::new("TKN", price, price * (1.0 + drift), volume))
    })
}

fn whale_move() -> impl Strategy<Value = Observation> {
    (0.0f64..5e7, proptest::option::of(0.0f64..=1.0)).prop_map(|(usd_amount, confidence)| {
        Observation::WhaleMove(WhaleMove {
            address: "0x47ac0fb4f2d84898e4d9e7b4dab3c24507a6d503".to_string(),
            asset: "ETH".to_string(),
            usd_amount,
            intent: "accumulating".to_string(),
            chain: "Base".to_string(),
            confidence,
        })
    })
}

fn liquidation() -> impl Strategy<Value = Observation> {
    (0.0f64..2e8, 1000.0f64..4000.0, 1000.0f64..4000.0).prop_map(|(at_risk, trigger, current)| {
        Observation::LiquidationRisk(LiquidationRisk::new("Aave V3", at_risk, trigger, current))
    })
}

fn tvl_delta() -> impl Strategy<Value = Observation> {
    (0.0f64..1e10, -300.0f64..300.0)
        .prop_map(|(tvl, change)| Observation::TvlDelta(TvlDelta::new("Proto", tvl, change)))
}

fn gas() -> impl Strategy<Value = Observation> {
    (0.0f64..200.0).prop_map(|gwei| Observation::GasPrice(GasPrice { chain: "Ethereum".to_string(), gwei }))
}

fn observation() -> impl Strategy<Value = Observation> {
    prop_oneof![price_pair(), whale_move(), liquidation(), tvl_delta(), gas()]
}

fn spread_bps(p: &PricePair) -> f64 {
    (p.price_a - p.price_b).abs() / p.price_a.min(p.price_b) * 10_000.0
}

proptest! {
    #[test]
    fn ranked_output_is_bounded_and_sorted(batch in proptest::collection::vec(observation(), 0..40)) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ranked = score_and_rank_at(&batch, &Thresholds::default(), now);

        prop_assert!(ranked.len() <= batch.len());
        for opp in &ranked {
            prop_assert!((0.0..=1.0).contains(&opp.confidence));
            prop_assert!(opp.profit_potential >= 0.0);
        }
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score() >= pair[1].score());
        }
    }

    #[test]
    fn scoring_is_idempotent(batch in proptest::collection::vec(observation(), 0..40)) {
        let thresholds = Thresholds::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        prop_assert_eq!(
            score_and_rank_at(&batch, &thresholds, now),
            score_and_rank_at(&batch, &thresholds, now)
        );
    }

    #[test]
    fn sub_threshold_spreads_never_emitted(batch in proptest::collection::vec(price_pair(), 0..40)) {
        let thresholds = Thresholds::default();
        let expected = batch
            .iter()
            .filter(|o| matches!(o, Observation::PricePair(p) if spread_bps(p) > thresholds.min_arbitrage_bps))
            .count();

        let ranked = score_and_rank_at(&batch, &thresholds, Utc::now());

        prop_assert_eq!(ranked.len(), expected);
        prop_assert!(ranked.iter().all(|o| o.kind == OpportunityKind::CrossChainArbitrage));
    }

    #[test]
    fn small_whales_never_emitted(batch in proptest::collection::vec(whale_move(), 0..40)) {
        let thresholds = Thresholds::default();
        let expected = batch
            .iter()
            .filter(|o| matches!(o, Observation::WhaleMove(w) if w.usd_amount > thresholds.min_whale_amount))
            .count();

        prop_assert_eq!(score_and_rank_at(&batch, &thresholds, Utc::now()).len(), expected);
    }
}

#[test]
fn equal_scores_keep_input_order() {
    let whales: Vec<Observation> = (0..5)
        .map(|i| {
            Observation::WhaleMove(WhaleMove {
                address: format!("0x{:040x}", i),
                asset: format!("T{}", i),
                usd_amount: 2_000_000.0,
                intent: "same".to_string(),
                chain: "Base".to_string(),
                confidence: Some(0.7),
            })
        })
        .collect();

    let ranked = score_and_rank_at(&whales, &Thresholds::default(), Utc::now());

    let assets: Vec<String> = ranked
        .iter()
        .map(|o| o.data["asset"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(assets, vec!["T0", "T1", "T2", "T3", "T4"]);
}

#[test]
fn empty_input_empty_output() {
    assert!(score_and_rank_at(&[], &Thresholds::default(), Utc::now()).is_empty());
}
