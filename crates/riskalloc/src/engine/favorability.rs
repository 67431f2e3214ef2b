use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationWarning, MetricId, MetricReading, ReadingSet};
use super::error::EngineConfigError;
use super::inputs::ReadingIndex;

const SCORE_FLOOR: f64 = 0.0;
const SCORE_CEILING: f64 = 100.0;

/// How a favorability rule compares a reading against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    AtLeast,
    Below,
    AtMost,
}

impl Comparison {
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => value > threshold,
            Comparison::AtLeast => value >= threshold,
            Comparison::Below => value < threshold,
            Comparison::AtMost => value <= threshold,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Comparison::Above => ">",
            Comparison::AtLeast => ">=",
            Comparison::Below => "<",
            Comparison::AtMost => "<=",
        }
    }
}

/// Fixed point adjustment applied when `metric <comparison> threshold` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorabilityRule {
    pub id: String,
    pub metric: MetricId,
    pub comparison: Comparison,
    pub threshold: f64,
    pub delta: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavorabilityConfig {
    pub baseline: f64,
    pub rules: Vec<FavorabilityRule>,
}

/// A rule that fired during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredRule {
    pub rule_id: String,
    pub delta: f64,
    pub observed: f64,
}

/// Secondary sub-score bounded to [0, 100] with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubScore {
    pub value: f64,
    pub baseline: f64,
    pub reasons: Vec<String>,
    pub fired: Vec<FiredRule>,
}

/// Accumulator scorer: starts at the baseline and walks the rule table in order.
#[derive(Debug, Clone)]
pub struct FavorabilityEngine {
    config: FavorabilityConfig,
    metrics: HashSet<MetricId>,
}

impl FavorabilityEngine {
    pub fn new(config: FavorabilityConfig) -> Result<Self, EngineConfigError> {
        if !config.baseline.is_finite() || !(SCORE_FLOOR..=SCORE_CEILING).contains(&config.baseline)
        {
            return Err(EngineConfigError::InvalidBaseline(config.baseline));
        }

        let mut ids = HashSet::new();
        for rule in &config.rules {
            if !ids.insert(rule.id.as_str()) {
                return Err(EngineConfigError::DuplicateRule(rule.id.clone()));
            }
            if !rule.threshold.is_finite() {
                return Err(EngineConfigError::InvalidRuleValue {
                    rule: rule.id.clone(),
                    field: "threshold",
                });
            }
            if !rule.delta.is_finite() || rule.delta == 0.0 {
                return Err(EngineConfigError::InvalidRuleValue {
                    rule: rule.id.clone(),
                    field: "delta",
                });
            }
        }

        let metrics = config.rules.iter().map(|rule| rule.metric.clone()).collect();
        Ok(Self { config, metrics })
    }

    pub fn config(&self) -> &FavorabilityConfig {
        &self.config
    }

    pub fn knows(&self, metric_id: &MetricId) -> bool {
        self.metrics.contains(metric_id)
    }

    /// Sub-score for one set of readings, plus the inputs it had to ignore.
    pub fn evaluate(&self, readings: &[MetricReading]) -> (SubScore, Vec<EvaluationWarning>) {
        let mut warnings = Vec::new();
        let index = ReadingIndex::build(
            ReadingSet::Favorability,
            readings,
            |metric_id| self.knows(metric_id),
            &mut warnings,
        );
        (self.evaluate_index(&index), warnings)
    }

    pub(crate) fn evaluate_index(&self, readings: &ReadingIndex) -> SubScore {
        let mut value = self.config.baseline;
        let mut reasons = Vec::new();
        let mut fired = Vec::new();

        for rule in &self.config.rules {
            let Some(observed) = readings.value(&rule.metric) else {
                continue;
            };
            if !rule.comparison.holds(observed, rule.threshold) {
                continue;
            }

            value += rule.delta;
            reasons.push(format!(
                "{:+} {} ({} {:.2} {} {})",
                rule.delta,
                rule.reason,
                rule.metric,
                observed,
                rule.comparison.symbol(),
                rule.threshold
            ));
            fired.push(FiredRule {
                rule_id: rule.id.clone(),
                delta: rule.delta,
                observed,
            });
        }

        SubScore {
            value: value.clamp(SCORE_FLOOR, SCORE_CEILING),
            baseline: self.config.baseline,
            reasons,
            fired,
        }
    }
}
