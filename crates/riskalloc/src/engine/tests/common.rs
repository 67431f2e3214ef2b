use crate::engine::{
    AdjustmentPolicy, AdjustmentRule, AdjustmentSignals, AllocationEngine, AllocationProfile,
    AllocationVector, Bucket, EngineConfig, EvaluationRequest, MetricReading, RiskTier,
    RuleTrigger, SentimentLabel,
};

pub(super) const TOLERANCE: f64 = 1e-9;

pub(super) fn engine() -> AllocationEngine {
    AllocationEngine::standard().expect("standard tables are valid")
}

pub(super) fn standard_config() -> EngineConfig {
    EngineConfig::standard()
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {expected}, got {actual}"
    );
}

/// Every primary indicator inside its best band.
pub(super) fn calm_primary() -> Vec<MetricReading> {
    vec![
        MetricReading::new("market-volatility", 8.0),
        MetricReading::new("yield-curve", 2.0),
        MetricReading::new("credit-spread", 2.5),
        MetricReading::new("jobless-claims", 180.0),
        MetricReading::new("manufacturing-pmi", 60.0),
        MetricReading::new("market-drawdown", 1.0),
        MetricReading::new("financial-conditions", -0.7),
    ]
}

/// Every primary indicator inside its score-4 band.
pub(super) fn balanced_primary() -> Vec<MetricReading> {
    vec![
        MetricReading::new("market-volatility", 25.0),
        MetricReading::new("yield-curve", 0.1),
        MetricReading::new("credit-spread", 5.0),
        MetricReading::new("jobless-claims", 280.0),
        MetricReading::new("manufacturing-pmi", 51.0),
        MetricReading::new("market-drawdown", 12.0),
        MetricReading::new("financial-conditions", -0.1),
    ]
}

/// Every primary indicator inside its worst band.
pub(super) fn stressed_primary() -> Vec<MetricReading> {
    vec![
        MetricReading::new("market-volatility", 55.0),
        MetricReading::new("yield-curve", -1.0),
        MetricReading::new("credit-spread", 10.0),
        MetricReading::new("jobless-claims", 420.0),
        MetricReading::new("manufacturing-pmi", 40.0),
        MetricReading::new("market-drawdown", 35.0),
        MetricReading::new("financial-conditions", 0.8),
    ]
}

pub(super) fn all_primary_missing() -> Vec<MetricReading> {
    [
        "market-volatility",
        "yield-curve",
        "credit-spread",
        "jobless-claims",
        "manufacturing-pmi",
        "market-drawdown",
        "financial-conditions",
    ]
    .into_iter()
    .map(MetricReading::missing)
    .collect()
}

/// Attractive nominal and real yields: 50 + 15 + 20.
pub(super) fn supportive_bond_readings() -> Vec<MetricReading> {
    vec![
        MetricReading::new("treasury-10y", 4.8),
        MetricReading::new("real-yield-10y", 2.2),
        MetricReading::new("inflation-yoy", 3.0),
    ]
}

/// Thin yields and hot inflation: 50 - 10 - 15 - 15.
pub(super) fn hostile_bond_readings() -> Vec<MetricReading> {
    vec![
        MetricReading::new("treasury-10y", 2.5),
        MetricReading::new("real-yield-10y", 0.2),
        MetricReading::new("inflation-yoy", 5.0),
    ]
}

/// Weighted sentiment of 82: four signals at their greedy extreme, junk-bond
/// spreads at their fearful extreme and safe-haven demand at 80.
pub(super) fn extreme_greed_readings() -> Vec<MetricReading> {
    vec![
        MetricReading::new("market-volatility", 12.0),
        MetricReading::new("put-call-ratio", 0.6),
        MetricReading::new("market-momentum", 10.0),
        MetricReading::new("junk-bond-spread", 8.0),
        MetricReading::new("safe-haven-demand", 3.0),
    ]
}

/// Every signal at its fearful extreme.
pub(super) fn extreme_fear_readings() -> Vec<MetricReading> {
    vec![
        MetricReading::new("market-volatility", 45.0),
        MetricReading::new("put-call-ratio", 1.3),
        MetricReading::new("market-momentum", -12.0),
        MetricReading::new("junk-bond-spread", 9.0),
        MetricReading::new("safe-haven-demand", -6.0),
    ]
}

pub(super) fn request(
    profile: AllocationProfile,
    primary: Vec<MetricReading>,
    favorability: Vec<MetricReading>,
    sentiment: Vec<MetricReading>,
) -> EvaluationRequest {
    EvaluationRequest {
        profile,
        primary,
        favorability,
        sentiment,
    }
}

pub(super) fn signals(tier: RiskTier, sub_score: f64, sentiment: f64) -> AdjustmentSignals {
    let engine = engine();
    AdjustmentSignals {
        tier,
        sub_score,
        sentiment,
        sentiment_label: engine.sentiment().label_for(sentiment),
    }
}

pub(super) fn neutral_signals(tier: RiskTier) -> AdjustmentSignals {
    AdjustmentSignals {
        tier,
        sub_score: 50.0,
        sentiment: 50.0,
        sentiment_label: SentimentLabel::Neutral,
    }
}

pub(super) fn vector(shares: [f64; 5]) -> AllocationVector {
    AllocationVector::from_entries(Bucket::ALL.into_iter().zip(shares)).expect("valid vector")
}

pub(super) fn transfer_rule(
    id: &str,
    priority: u16,
    trigger: RuleTrigger,
    donor: Bucket,
    recipient: Bucket,
    amount: f64,
) -> AdjustmentRule {
    AdjustmentRule {
        id: id.to_string(),
        priority,
        trigger,
        donor,
        recipient,
        amount,
        suppresses: Vec::new(),
        description: String::new(),
    }
}

pub(super) fn policy(max_bucket_shift: f64, rules: Vec<AdjustmentRule>) -> AdjustmentPolicy {
    AdjustmentPolicy {
        max_bucket_shift,
        decimals: 2,
        rules,
    }
}

pub(super) fn always() -> RuleTrigger {
    RuleTrigger::SubScoreAtLeast { value: 0.0 }
}
