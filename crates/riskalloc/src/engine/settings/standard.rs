use std::collections::BTreeMap;

use crate::engine::adjustments::{AdjustmentPolicy, AdjustmentRule, RuleTrigger};
use crate::engine::curve::{Band, MetricDefinition};
use crate::engine::domain::{AllocationProfile, Bucket, Direction, MetricId, RiskTier};
use crate::engine::favorability::{Comparison, FavorabilityConfig, FavorabilityRule};
use crate::engine::matrix::{DecisionMatrixConfig, MatrixEntry};
use crate::engine::sentiment::{SentimentConfig, SentimentLevels, SentimentSignal};
use crate::engine::tier::TierBand;

/// Band labels for scores 1 through 7.
const SCORE_LABELS: [&str; 7] = [
    "excellent",
    "good",
    "fair",
    "neutral",
    "elevated",
    "high",
    "severe",
];

/// Seven bands split at `edges` (ascending raw values). Scores rise with the
/// value for `AscendingBad` and fall with it for `DescendingBad`.
fn bands(direction: Direction, floor: Option<f64>, edges: [f64; 6]) -> Vec<Band> {
    (0..7)
        .map(|index| {
            let min = if index == 0 { floor } else { Some(edges[index - 1]) };
            let max = edges.get(index).copied();
            let rank = match direction {
                Direction::AscendingBad => index,
                Direction::DescendingBad => 6 - index,
            };
            Band::new(min, max, (rank + 1) as f64, SCORE_LABELS[rank])
        })
        .collect()
}

fn metric(
    id: &str,
    weight: f64,
    direction: Direction,
    floor: Option<f64>,
    edges: [f64; 6],
) -> MetricDefinition {
    MetricDefinition {
        id: MetricId::from(id),
        weight,
        direction,
        neutral_score: 4.0,
        bands: bands(direction, floor, edges),
    }
}

#[rustfmt::skip]
pub(super) fn metrics() -> Vec<MetricDefinition> {
    use Direction::{AscendingBad, DescendingBad};

    vec![
        // VIX level.
        metric("market-volatility", 0.15, AscendingBad, Some(0.0), [10.0, 15.0, 22.0, 30.0, 40.0, 50.0]),
        // 10y minus 2y treasury spread, percentage points.
        metric("yield-curve", 0.15, DescendingBad, None, [-0.5, -0.2, 0.0, 0.25, 0.75, 1.5]),
        // High-yield option-adjusted spread, percent.
        metric("credit-spread", 0.15, AscendingBad, Some(0.0), [3.0, 3.5, 4.5, 5.5, 7.0, 9.0]),
        // Initial jobless claims, thousands (4-week average).
        metric("jobless-claims", 0.15, AscendingBad, Some(0.0), [200.0, 230.0, 260.0, 300.0, 350.0, 400.0]),
        metric("manufacturing-pmi", 0.15, DescendingBad, Some(0.0), [44.0, 47.0, 50.0, 52.0, 55.0, 58.0]),
        // Percent below the trailing 52-week high of the broad index.
        metric("market-drawdown", 0.15, AscendingBad, Some(0.0), [3.0, 5.0, 10.0, 15.0, 20.0, 30.0]),
        // Chicago Fed national financial conditions index.
        metric("financial-conditions", 0.10, AscendingBad, None, [-0.5, -0.35, -0.2, 0.0, 0.25, 0.5]),
    ]
}

pub(super) fn tiers() -> Vec<TierBand> {
    vec![
        TierBand::new(RiskTier::Excellent, 1.0, 2.0),
        TierBand::new(RiskTier::Favorable, 2.0, 3.0),
        TierBand::new(RiskTier::Balanced, 3.0, 4.5),
        TierBand::new(RiskTier::Cautious, 4.5, 5.5),
        TierBand::new(RiskTier::Defensive, 5.5, 7.0),
    ]
}

fn favorability_rule(
    id: &str,
    metric: &str,
    comparison: Comparison,
    threshold: f64,
    delta: f64,
    reason: &str,
) -> FavorabilityRule {
    FavorabilityRule {
        id: id.to_string(),
        metric: MetricId::from(metric),
        comparison,
        threshold,
        delta,
        reason: reason.to_string(),
    }
}

#[rustfmt::skip]
pub(super) fn favorability() -> FavorabilityConfig {
    use Comparison::{Above, AtLeast, AtMost, Below};

    FavorabilityConfig {
        baseline: 50.0,
        rules: vec![
            favorability_rule("attractive-nominal-yield", "treasury-10y", AtLeast, 4.5, 15.0, "nominal 10-year yield offers attractive carry"),
            favorability_rule("thin-nominal-yield", "treasury-10y", Below, 3.0, -10.0, "nominal 10-year yield too thin to cushion duration"),
            favorability_rule("positive-real-yield", "real-yield-10y", AtLeast, 2.0, 20.0, "real yield well above zero"),
            favorability_rule("negative-real-yield", "real-yield-10y", Below, 0.5, -15.0, "real yield near or below zero"),
            favorability_rule("hot-inflation", "inflation-yoy", Above, 4.0, -15.0, "inflation running hot"),
            favorability_rule("contained-inflation", "inflation-yoy", AtMost, 2.5, 10.0, "inflation near target"),
            favorability_rule("disinflation", "inflation-trend", Below, 0.0, 5.0, "inflation trending lower"),
            favorability_rule("policy-easing", "policy-rate-trend", Below, 0.0, 10.0, "policy rate being cut"),
            favorability_rule("policy-tightening", "policy-rate-trend", Above, 0.0, -10.0, "policy rate being raised"),
            favorability_rule("inverted-curve", "yield-curve", Below, 0.0, -5.0, "inverted yield curve"),
        ],
    }
}

fn signal(id: &str, weight: f64, floor: f64, ceiling: f64, inverted: bool) -> SentimentSignal {
    SentimentSignal {
        id: MetricId::from(id),
        weight,
        floor,
        ceiling,
        inverted,
    }
}

pub(super) fn sentiment() -> SentimentConfig {
    SentimentConfig {
        neutral_value: 50.0,
        levels: SentimentLevels::default(),
        signals: vec![
            signal("market-volatility", 0.25, 12.0, 40.0, true),
            signal("put-call-ratio", 0.20, 0.6, 1.2, true),
            // Broad index distance from its 125-day average, percent.
            signal("market-momentum", 0.25, -10.0, 10.0, false),
            signal("junk-bond-spread", 0.15, 3.0, 8.0, true),
            // 20-day stock return minus bond return, percentage points.
            signal("safe-haven-demand", 0.15, -5.0, 5.0, false),
        ],
    }
}

/// Shares in `Bucket::ALL` order: us equity, intl equity, real assets, bonds, cash.
#[rustfmt::skip]
const MATRIX: [(RiskTier, AllocationProfile, [f64; 5]); 20] = [
    (RiskTier::Excellent, AllocationProfile::EarlyCareer, [55.0, 20.0, 10.0, 10.0, 5.0]),
    (RiskTier::Favorable, AllocationProfile::EarlyCareer, [50.0, 18.0, 10.0, 15.0, 7.0]),
    (RiskTier::Balanced, AllocationProfile::EarlyCareer, [45.0, 15.0, 10.0, 20.0, 10.0]),
    (RiskTier::Cautious, AllocationProfile::EarlyCareer, [35.0, 10.0, 10.0, 30.0, 15.0]),
    (RiskTier::Defensive, AllocationProfile::EarlyCareer, [25.0, 5.0, 10.0, 35.0, 25.0]),
    (RiskTier::Excellent, AllocationProfile::MidCareer, [45.0, 15.0, 10.0, 25.0, 5.0]),
    (RiskTier::Favorable, AllocationProfile::MidCareer, [40.0, 12.0, 10.0, 30.0, 8.0]),
    (RiskTier::Balanced, AllocationProfile::MidCareer, [35.0, 10.0, 10.0, 35.0, 10.0]),
    (RiskTier::Cautious, AllocationProfile::MidCareer, [28.0, 7.0, 10.0, 40.0, 15.0]),
    (RiskTier::Defensive, AllocationProfile::MidCareer, [20.0, 5.0, 10.0, 40.0, 25.0]),
    (RiskTier::Excellent, AllocationProfile::PreRetirement, [35.0, 10.0, 10.0, 35.0, 10.0]),
    (RiskTier::Favorable, AllocationProfile::PreRetirement, [30.0, 10.0, 10.0, 38.0, 12.0]),
    (RiskTier::Balanced, AllocationProfile::PreRetirement, [25.0, 8.0, 10.0, 42.0, 15.0]),
    (RiskTier::Cautious, AllocationProfile::PreRetirement, [20.0, 5.0, 10.0, 45.0, 20.0]),
    (RiskTier::Defensive, AllocationProfile::PreRetirement, [15.0, 5.0, 5.0, 45.0, 30.0]),
    (RiskTier::Excellent, AllocationProfile::Retired, [25.0, 8.0, 7.0, 45.0, 15.0]),
    (RiskTier::Favorable, AllocationProfile::Retired, [22.0, 6.0, 7.0, 47.0, 18.0]),
    (RiskTier::Balanced, AllocationProfile::Retired, [18.0, 5.0, 7.0, 50.0, 20.0]),
    (RiskTier::Cautious, AllocationProfile::Retired, [15.0, 5.0, 5.0, 50.0, 25.0]),
    (RiskTier::Defensive, AllocationProfile::Retired, [10.0, 3.0, 5.0, 47.0, 35.0]),
];

pub(super) fn matrix() -> DecisionMatrixConfig {
    let entries = MATRIX
        .iter()
        .map(|(tier, profile, shares)| MatrixEntry {
            tier: *tier,
            profile: *profile,
            allocation: Bucket::ALL
                .into_iter()
                .zip(shares.iter().copied())
                .collect::<BTreeMap<_, _>>(),
        })
        .collect();

    DecisionMatrixConfig {
        unknown_fallback: RiskTier::Balanced,
        entries,
    }
}

fn rule(
    id: &str,
    priority: u16,
    trigger: RuleTrigger,
    donor: Bucket,
    recipient: Bucket,
    suppresses: &[&str],
    description: &str,
) -> AdjustmentRule {
    AdjustmentRule {
        id: id.to_string(),
        priority,
        trigger,
        donor,
        recipient,
        amount: 5.0,
        suppresses: suppresses.iter().map(|target| target.to_string()).collect(),
        description: description.to_string(),
    }
}

pub(super) fn adjustments() -> AdjustmentPolicy {
    AdjustmentPolicy {
        max_bucket_shift: 10.0,
        decimals: 2,
        rules: vec![
            rule(
                "defensive-derisk",
                10,
                RuleTrigger::TierAtLeast {
                    tier: RiskTier::Cautious,
                },
                Bucket::UsEquity,
                Bucket::Cash,
                &["favorability-extend-duration", "fear-contrarian-buy"],
                "elevated primary risk moves equity into cash",
            ),
            rule(
                "greed-override",
                20,
                RuleTrigger::AllOf {
                    triggers: vec![
                        RuleTrigger::SentimentAtLeast { value: 75.0 },
                        RuleTrigger::TierAtMost {
                            tier: RiskTier::Favorable,
                        },
                    ],
                },
                Bucket::UsEquity,
                Bucket::Cash,
                &["favorability-extend-duration"],
                "extreme greed during calm conditions banks equity gains in cash",
            ),
            rule(
                "favorability-extend-duration",
                30,
                RuleTrigger::SubScoreAtLeast { value: 70.0 },
                Bucket::Cash,
                Bucket::Bonds,
                &[],
                "favorable bond backdrop moves cash into bonds",
            ),
            rule(
                "favorability-trim-duration",
                40,
                RuleTrigger::SubScoreBelow { value: 30.0 },
                Bucket::Bonds,
                Bucket::Cash,
                &[],
                "unfavorable bond backdrop moves bonds into cash",
            ),
            rule(
                "fear-contrarian-buy",
                50,
                RuleTrigger::SentimentBelow { value: 25.0 },
                Bucket::Cash,
                Bucket::UsEquity,
                &[],
                "extreme fear deploys cash into equity",
            ),
        ],
    }
}
