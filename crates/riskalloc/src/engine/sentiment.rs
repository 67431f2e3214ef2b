use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationWarning, MetricId, MetricReading, ReadingSet};
use super::error::EngineConfigError;
use super::inputs::ReadingIndex;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A sentiment input mapped linearly from `[floor, ceiling]` onto [0, 100].
///
/// `inverted` signals (volatility, put/call ratio, junk-bond spreads) read
/// higher raw values as lower risk appetite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    pub id: MetricId,
    pub weight: f64,
    pub floor: f64,
    pub ceiling: f64,
    #[serde(default)]
    pub inverted: bool,
}

impl SentimentSignal {
    pub fn normalize(&self, value: f64) -> f64 {
        let scaled = ((value - self.floor) / (self.ceiling - self.floor) * 100.0).clamp(0.0, 100.0);
        if self.inverted {
            100.0 - scaled
        } else {
            scaled
        }
    }
}

/// Lower bounds of the upper four labels; below `fear` is extreme fear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentLevels {
    pub fear: f64,
    pub neutral: f64,
    pub greed: f64,
    pub extreme_greed: f64,
}

impl Default for SentimentLevels {
    fn default() -> Self {
        Self {
            fear: 25.0,
            neutral: 45.0,
            greed: 55.0,
            extreme_greed: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    pub neutral_value: f64,
    #[serde(default)]
    pub levels: SentimentLevels,
    pub signals: Vec<SentimentSignal>,
}

/// Five-level sentiment scale, lowest risk appetite first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentLabel {
    pub const fn label(self) -> &'static str {
        match self {
            SentimentLabel::ExtremeFear => "extreme_fear",
            SentimentLabel::Fear => "fear",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Greed => "greed",
            SentimentLabel::ExtremeGreed => "extreme_greed",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentComponent {
    pub signal: MetricId,
    pub raw_value: Option<f64>,
    pub normalized: Option<f64>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentScore {
    pub value: f64,
    pub label: SentimentLabel,
    pub active_weight: f64,
    pub components: Vec<SentimentComponent>,
}

/// Weighted composite of normalized sentiment signals.
#[derive(Debug, Clone)]
pub struct SentimentEngine {
    config: SentimentConfig,
}

impl SentimentEngine {
    pub fn new(config: SentimentConfig) -> Result<Self, EngineConfigError> {
        let levels = config.levels;
        let ladder = [
            0.0,
            levels.fear,
            levels.neutral,
            levels.greed,
            levels.extreme_greed,
            100.0,
        ];
        let ascending = ladder
            .windows(2)
            .all(|pair| pair[0].is_finite() && pair[1].is_finite() && pair[0] <= pair[1]);
        if !ascending || !(0.0..=100.0).contains(&config.neutral_value) {
            return Err(EngineConfigError::InvalidSentimentLevels);
        }

        let mut seen = HashSet::new();
        for signal in &config.signals {
            if !seen.insert(&signal.id) {
                return Err(EngineConfigError::DuplicateMetric {
                    set: ReadingSet::Sentiment,
                    metric: signal.id.clone(),
                });
            }
            if !signal.weight.is_finite() || !(0.0..=1.0).contains(&signal.weight) {
                return Err(EngineConfigError::InvalidWeight {
                    set: ReadingSet::Sentiment,
                    metric: signal.id.clone(),
                    weight: signal.weight,
                });
            }
            if !signal.floor.is_finite() || !signal.ceiling.is_finite() || signal.floor >= signal.ceiling
            {
                return Err(EngineConfigError::InvalidSignalRange {
                    signal: signal.id.clone(),
                });
            }
        }

        let total: f64 = config.signals.iter().map(|signal| signal.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineConfigError::WeightSum {
                set: ReadingSet::Sentiment,
                total,
            });
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &SentimentConfig {
        &self.config
    }

    pub fn knows(&self, metric_id: &MetricId) -> bool {
        self.config
            .signals
            .iter()
            .any(|signal| &signal.id == metric_id)
    }

    pub fn label_for(&self, value: f64) -> SentimentLabel {
        let levels = self.config.levels;
        if value < levels.fear {
            SentimentLabel::ExtremeFear
        } else if value < levels.neutral {
            SentimentLabel::Fear
        } else if value < levels.greed {
            SentimentLabel::Neutral
        } else if value < levels.extreme_greed {
            SentimentLabel::Greed
        } else {
            SentimentLabel::ExtremeGreed
        }
    }

    pub fn evaluate(
        &self,
        readings: &[MetricReading],
    ) -> (SentimentScore, Vec<EvaluationWarning>) {
        let mut warnings = Vec::new();
        let index = ReadingIndex::build(
            ReadingSet::Sentiment,
            readings,
            |metric_id| self.knows(metric_id),
            &mut warnings,
        );
        (self.evaluate_index(&index), warnings)
    }

    pub(crate) fn evaluate_index(&self, readings: &ReadingIndex) -> SentimentScore {
        let components: Vec<SentimentComponent> = self
            .config
            .signals
            .iter()
            .map(|signal| {
                let raw_value = readings.value(&signal.id);
                SentimentComponent {
                    signal: signal.id.clone(),
                    raw_value,
                    normalized: raw_value.map(|value| signal.normalize(value)),
                    weight: signal.weight,
                }
            })
            .collect();

        let (weighted, active_weight) = components
            .iter()
            .filter_map(|component| component.normalized.map(|value| (value, component.weight)))
            .fold((0.0, 0.0), |(sum, weight_sum), (value, weight)| {
                (sum + value * weight, weight_sum + weight)
            });

        let value = if active_weight > f64::EPSILON {
            (weighted / active_weight).clamp(0.0, 100.0)
        } else {
            self.config.neutral_value
        };

        SentimentScore {
            value,
            label: self.label_for(value),
            active_weight,
            components,
        }
    }
}
