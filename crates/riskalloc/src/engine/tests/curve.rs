use super::common::*;
use crate::engine::{
    Band, Direction, EngineConfigError, MetricCatalog, MetricDefinition, MetricId, ScoreCurve,
    WatchDirection,
};

fn definition(direction: Direction, bands: Vec<Band>) -> MetricDefinition {
    MetricDefinition {
        id: MetricId::from("test-metric"),
        weight: 1.0,
        direction,
        neutral_score: 4.0,
        bands,
    }
}

fn two_band_curve() -> ScoreCurve {
    ScoreCurve::new(definition(
        Direction::AscendingBad,
        vec![
            Band::new(Some(0.0), Some(10.0), 1.0, "low"),
            Band::new(Some(10.0), Some(20.0), 2.0, "high"),
        ],
    ))
    .expect("valid curve")
}

#[test]
fn volatility_reading_scores_fair() {
    let engine = engine();
    let point = engine
        .score_metric(&MetricId::from("market-volatility"), Some(19.4))
        .expect("configured metric");

    assert_eq!(point.score, 3.0);
    assert_eq!(point.label, "fair");
    assert!(point.observed);
}

#[test]
fn band_lower_bounds_are_inclusive() {
    let curve = two_band_curve();

    assert_eq!(curve.evaluate(Some(9.999)).score, 1.0);
    assert_eq!(curve.evaluate(Some(10.0)).score, 2.0);
}

#[test]
fn values_outside_the_table_clamp_to_outer_bands() {
    let curve = two_band_curve();

    assert_eq!(curve.evaluate(Some(-3.0)).label, "low");
    assert_eq!(curve.evaluate(Some(20.0)).label, "high");
    assert_eq!(curve.evaluate(Some(1e9)).label, "high");
}

#[test]
fn missing_and_non_finite_values_score_neutral() {
    let curve = two_band_curve();

    for value in [None, Some(f64::NAN), Some(f64::INFINITY)] {
        let point = curve.evaluate(value);
        assert_eq!(point.score, 4.0);
        assert_eq!(point.label, "unknown");
        assert!(!point.observed);
    }
}

#[test]
fn unconfigured_metric_has_no_score() {
    let engine = engine();
    assert!(engine
        .score_metric(&MetricId::from("gold-price"), Some(2000.0))
        .is_none());
}

#[test]
fn standard_curves_are_monotonic_in_their_direction() {
    let engine = engine();

    for curve in engine.catalog().curves() {
        let edges: Vec<f64> = curve
            .bands()
            .iter()
            .flat_map(|band| [band.min, band.max])
            .flatten()
            .collect();
        let low = edges.iter().copied().fold(f64::INFINITY, f64::min) - 5.0;
        let high = edges.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 5.0;
        let steps = 2_000;

        let mut previous = curve.evaluate(Some(low)).score;
        for step in 1..=steps {
            let value = low + (high - low) * step as f64 / steps as f64;
            let score = curve.evaluate(Some(value)).score;
            match curve.direction() {
                Direction::AscendingBad => assert!(
                    score >= previous,
                    "{} fell from {previous} to {score} at {value}",
                    curve.id()
                ),
                Direction::DescendingBad => assert!(
                    score <= previous,
                    "{} rose from {previous} to {score} at {value}",
                    curve.id()
                ),
            }
            previous = score;
        }
    }
}

#[test]
fn next_threshold_for_ascending_metric_watches_rising_values() {
    let engine = engine();
    let next = engine
        .next_threshold(&MetricId::from("market-volatility"), 3.0)
        .expect("a worse band exists");

    assert_eq!(next.boundary, 22.0);
    assert_eq!(next.direction, WatchDirection::Rising);
    assert_eq!(next.score, 4.0);
    assert_eq!(next.label, "neutral");
    assert!(next.summary().contains("value rising"));
}

#[test]
fn next_threshold_for_descending_metric_watches_falling_values() {
    let engine = engine();
    let next = engine
        .next_threshold(&MetricId::from("yield-curve"), 3.0)
        .expect("a worse band exists");

    assert_eq!(next.boundary, 0.25);
    assert_eq!(next.direction, WatchDirection::Falling);
    assert_eq!(next.score, 4.0);
}

#[test]
fn next_threshold_is_absent_in_worst_band_or_for_unknown_scores() {
    let engine = engine();
    let volatility = MetricId::from("market-volatility");

    assert!(engine.next_threshold(&volatility, 7.0).is_none());
    assert!(engine.next_threshold(&volatility, 3.5).is_none());
    assert!(engine
        .next_threshold(&MetricId::from("gold-price"), 1.0)
        .is_none());
}

#[test]
fn next_threshold_skips_plateau_bands() {
    let curve = ScoreCurve::new(definition(
        Direction::AscendingBad,
        vec![
            Band::new(None, Some(5.0), 1.0, "calm"),
            Band::new(Some(5.0), Some(8.0), 1.0, "calm"),
            Band::new(Some(8.0), None, 3.0, "stressed"),
        ],
    ))
    .expect("valid curve");

    let next = curve.next_threshold(1.0).expect("worse band");
    assert_eq!(next.boundary, 8.0);
    assert_eq!(next.label, "stressed");
}

#[test]
fn rejects_gaps_overlaps_and_open_interior_bands() {
    let gap = ScoreCurve::new(definition(
        Direction::AscendingBad,
        vec![
            Band::new(Some(0.0), Some(10.0), 1.0, "low"),
            Band::new(Some(11.0), Some(20.0), 2.0, "high"),
        ],
    ));
    assert!(matches!(gap, Err(EngineConfigError::BandGap { index: 0, .. })));

    let overlap = ScoreCurve::new(definition(
        Direction::AscendingBad,
        vec![
            Band::new(Some(0.0), Some(12.0), 1.0, "low"),
            Band::new(Some(10.0), Some(20.0), 2.0, "high"),
        ],
    ));
    assert!(matches!(overlap, Err(EngineConfigError::BandOverlap { .. })));

    let open = ScoreCurve::new(definition(
        Direction::AscendingBad,
        vec![
            Band::new(Some(0.0), None, 1.0, "low"),
            Band::new(Some(10.0), Some(20.0), 2.0, "high"),
        ],
    ));
    assert!(matches!(
        open,
        Err(EngineConfigError::UnboundedInteriorBand { index: 0, .. })
    ));

    let empty = ScoreCurve::new(definition(Direction::AscendingBad, Vec::new()));
    assert!(matches!(empty, Err(EngineConfigError::EmptyBands { .. })));
}

#[test]
fn rejects_scores_running_against_the_direction() {
    let result = ScoreCurve::new(definition(
        Direction::DescendingBad,
        vec![
            Band::new(None, Some(0.0), 3.0, "inverted"),
            Band::new(Some(0.0), None, 5.0, "steep"),
        ],
    ));

    assert!(matches!(
        result,
        Err(EngineConfigError::NonMonotonicBands {
            index: 1,
            direction: "descending",
            ..
        })
    ));
}

#[test]
fn catalog_requires_weights_summing_to_one() {
    let mut first = definition(
        Direction::AscendingBad,
        vec![Band::new(None, None, 1.0, "any")],
    );
    first.weight = 0.5;
    let mut second = first.clone();
    second.id = MetricId::from("other-metric");
    second.weight = 0.4;

    let result = MetricCatalog::new(vec![first.clone(), second]);
    assert!(matches!(result, Err(EngineConfigError::WeightSum { .. })));

    let duplicate = MetricCatalog::new(vec![first.clone(), first]);
    assert!(matches!(
        duplicate,
        Err(EngineConfigError::DuplicateMetric { .. })
    ));
}

#[test]
fn engine_rejects_band_scores_off_the_tier_scale() {
    let mut config = standard_config();
    let bands = &mut config.metrics[0].bands;
    let last = bands.len() - 1;
    bands[last].score = 9.0;

    let result = crate::engine::AllocationEngine::new(config);
    assert!(matches!(
        result,
        Err(EngineConfigError::ScoreOutOfScale { score, .. }) if score == 9.0
    ));
}
