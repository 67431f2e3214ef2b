use serde::Serialize;

use super::curve::MetricCatalog;
use super::domain::{MetricId, RiskTier};
use super::inputs::ReadingIndex;
use super::tier::TierTable;

/// One primary indicator after scoring, kept for audits and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMetric {
    pub metric_id: MetricId,
    pub raw_value: Option<f64>,
    pub score: f64,
    pub label: String,
    pub weight: f64,
    pub weighted_contribution: f64,
    pub observed: bool,
}

/// Weighted composite over the observed primary indicators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub value: f64,
    pub tier: RiskTier,
    pub active_weight: f64,
    pub breakdown: Vec<ScoredMetric>,
}

impl CompositeScore {
    pub fn observed_count(&self) -> usize {
        self.breakdown.iter().filter(|metric| metric.observed).count()
    }
}

/// Renormalizes weights over observed metrics and falls back to a neutral
/// composite when nothing was observed.
#[derive(Debug, Clone)]
pub struct CompositeAggregator {
    neutral_value: f64,
}

impl CompositeAggregator {
    pub fn new(neutral_value: f64) -> Self {
        Self { neutral_value }
    }

    pub fn neutral_value(&self) -> f64 {
        self.neutral_value
    }

    pub fn aggregate(&self, scored: Vec<ScoredMetric>, tiers: &TierTable) -> CompositeScore {
        let active_weight: f64 = scored
            .iter()
            .filter(|metric| metric.observed)
            .map(|metric| metric.weight)
            .sum();

        if active_weight <= f64::EPSILON {
            return CompositeScore {
                value: self.neutral_value,
                tier: RiskTier::Unknown,
                active_weight: 0.0,
                breakdown: scored,
            };
        }

        let weighted: f64 = scored
            .iter()
            .map(|metric| metric.weighted_contribution)
            .sum();
        let value = weighted / active_weight;

        CompositeScore {
            value,
            tier: tiers.classify(value),
            active_weight,
            breakdown: scored,
        }
    }
}

/// Score every configured metric against the supplied readings, in catalog order.
pub(crate) fn score_metrics(catalog: &MetricCatalog, readings: &ReadingIndex) -> Vec<ScoredMetric> {
    catalog
        .curves()
        .iter()
        .map(|curve| {
            let raw_value = readings.value(curve.id());
            let point = curve.evaluate(raw_value);
            let weighted_contribution = if point.observed {
                point.score * curve.weight()
            } else {
                0.0
            };

            ScoredMetric {
                metric_id: curve.id().clone(),
                raw_value,
                score: point.score,
                label: point.label,
                weight: curve.weight(),
                weighted_contribution,
                observed: point.observed,
            }
        })
        .collect()
}
