use super::common::*;
use crate::engine::{
    Comparison, EngineConfigError, FavorabilityConfig, FavorabilityEngine, FavorabilityRule,
    EvaluationWarning, MetricId, MetricReading, ReadingSet,
};

#[test]
fn fired_rules_add_their_deltas_to_the_baseline() {
    let engine = engine();
    let (score, _) = engine.favorability().evaluate(&[
        MetricReading::new("real-yield-10y", 2.5),
        MetricReading::new("yield-curve", -0.3),
    ]);

    assert_eq!(score.baseline, 50.0);
    assert_eq!(score.value, 65.0);
    let fired: Vec<_> = score.fired.iter().map(|rule| rule.rule_id.as_str()).collect();
    assert_eq!(fired, ["positive-real-yield", "inverted-curve"]);
    assert_eq!(score.reasons.len(), 2);
    assert!(score.reasons[0].starts_with("+20 "));
    assert!(score.reasons[0].contains("real-yield-10y 2.50 >= 2"));
    assert!(score.reasons[1].starts_with("-5 "));
}

#[test]
fn no_readings_leave_the_baseline_untouched() {
    let (score, _) = engine().favorability().evaluate(&[]);

    assert_eq!(score.value, 50.0);
    assert!(score.reasons.is_empty());
}

#[test]
fn supportive_and_hostile_backdrops() {
    let engine = engine();

    assert_eq!(
        engine
            .favorability()
            .evaluate(&supportive_bond_readings())
            .0
            .value,
        85.0
    );
    assert_eq!(
        engine.favorability().evaluate(&hostile_bond_readings()).0.value,
        10.0
    );
}

#[test]
fn score_is_clamped_to_percentage_range() {
    let engine = engine();

    let (high, _) = engine.favorability().evaluate(&[
        MetricReading::new("treasury-10y", 5.0),
        MetricReading::new("real-yield-10y", 3.0),
        MetricReading::new("inflation-yoy", 2.0),
        MetricReading::new("inflation-trend", -0.4),
        MetricReading::new("policy-rate-trend", -0.25),
    ]);
    assert_eq!(high.value, 100.0);
    assert_eq!(high.fired.len(), 5);

    let (low, _) = engine.favorability().evaluate(&[
        MetricReading::new("treasury-10y", 2.0),
        MetricReading::new("real-yield-10y", 0.0),
        MetricReading::new("inflation-yoy", 6.0),
        MetricReading::new("policy-rate-trend", 0.5),
        MetricReading::new("yield-curve", -1.0),
    ]);
    assert_eq!(low.value, 0.0);
}

#[test]
fn missing_readings_never_fire_rules() {
    let (score, warnings) = engine().favorability().evaluate(&[
        MetricReading::missing("treasury-10y"),
        MetricReading::new("real-yield-10y", f64::NAN),
    ]);

    assert_eq!(score.value, 50.0);
    assert!(score.fired.is_empty());
    // an explicit gap is not a warning, a NaN is
    assert_eq!(
        warnings,
        vec![EvaluationWarning::NonFiniteValue {
            set: ReadingSet::Favorability,
            metric_id: MetricId::from("real-yield-10y"),
        }]
    );
}

#[test]
fn comparisons_respect_inclusive_and_strict_bounds() {
    assert!(Comparison::AtLeast.holds(4.5, 4.5));
    assert!(!Comparison::Above.holds(4.5, 4.5));
    assert!(Comparison::AtMost.holds(2.5, 2.5));
    assert!(!Comparison::Below.holds(2.5, 2.5));
}

fn rule(id: &str, delta: f64) -> FavorabilityRule {
    FavorabilityRule {
        id: id.to_string(),
        metric: MetricId::from("treasury-10y"),
        comparison: Comparison::Above,
        threshold: 4.0,
        delta,
        reason: "test".to_string(),
    }
}

#[test]
fn rejects_invalid_rule_tables() {
    let baseline = FavorabilityEngine::new(FavorabilityConfig {
        baseline: 120.0,
        rules: Vec::new(),
    });
    assert!(matches!(
        baseline,
        Err(EngineConfigError::InvalidBaseline(value)) if value == 120.0
    ));

    let duplicate = FavorabilityEngine::new(FavorabilityConfig {
        baseline: 50.0,
        rules: vec![rule("carry", 5.0), rule("carry", 10.0)],
    });
    assert!(matches!(duplicate, Err(EngineConfigError::DuplicateRule(id)) if id == "carry"));

    let zero = FavorabilityEngine::new(FavorabilityConfig {
        baseline: 50.0,
        rules: vec![rule("carry", 0.0)],
    });
    assert!(matches!(
        zero,
        Err(EngineConfigError::InvalidRuleValue { field: "delta", .. })
    ));
}
