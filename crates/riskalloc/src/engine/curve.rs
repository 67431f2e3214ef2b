use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{Direction, MetricId, ReadingSet, WatchDirection};
use super::error::EngineConfigError;

/// Label reported for a metric without a usable reading.
pub const UNKNOWN_LABEL: &str = "unknown";

const SCORE_EPSILON: f64 = 1e-9;
const WEIGHT_TOLERANCE: f64 = 1e-6;

fn default_neutral_score() -> f64 {
    4.0
}

/// Half-open raw-value interval `[min, max)` mapped to one normalized score.
///
/// `min: None` opens the first band downwards and `max: None` opens the last
/// band upwards. Finite outer bounds still clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    pub score: f64,
    pub label: String,
}

impl Band {
    pub fn new(min: Option<f64>, max: Option<f64>, score: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            score,
            label: label.into(),
        }
    }
}

/// Configuration of one primary indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: MetricId,
    pub weight: f64,
    pub direction: Direction,
    #[serde(default = "default_neutral_score")]
    pub neutral_score: f64,
    pub bands: Vec<Band>,
}

/// Score and band label assigned to a raw value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurvePoint {
    pub score: f64,
    pub label: String,
    pub observed: bool,
}

/// The next less favorable boundary for a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextThreshold {
    pub metric_id: MetricId,
    pub boundary: f64,
    pub direction: WatchDirection,
    pub score: f64,
    pub label: String,
}

impl NextThreshold {
    pub fn summary(&self) -> String {
        format!(
            "{} crosses into '{}' (score {:.0}) on {} past {}",
            self.metric_id,
            self.label,
            self.score,
            self.direction.label(),
            self.boundary
        )
    }
}

/// Validated band table for one indicator.
#[derive(Debug, Clone)]
pub struct ScoreCurve {
    definition: MetricDefinition,
}

impl ScoreCurve {
    pub fn new(definition: MetricDefinition) -> Result<Self, EngineConfigError> {
        validate_bands(&definition)?;
        Ok(Self { definition })
    }

    pub fn id(&self) -> &MetricId {
        &self.definition.id
    }

    pub fn weight(&self) -> f64 {
        self.definition.weight
    }

    pub fn direction(&self) -> Direction {
        self.definition.direction
    }

    pub fn neutral_score(&self) -> f64 {
        self.definition.neutral_score
    }

    pub fn bands(&self) -> &[Band] {
        &self.definition.bands
    }

    pub fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    /// Score a raw value; missing or non-finite values yield the neutral score.
    pub fn evaluate(&self, value: Option<f64>) -> CurvePoint {
        match value.filter(|value| value.is_finite()) {
            Some(value) => {
                let band = &self.definition.bands[self.band_index(value)];
                CurvePoint {
                    score: band.score,
                    label: band.label.clone(),
                    observed: true,
                }
            }
            None => CurvePoint {
                score: self.definition.neutral_score,
                label: UNKNOWN_LABEL.to_string(),
                observed: false,
            },
        }
    }

    /// Boundary crossed by one more unit of badness from the band scoring `score`.
    pub fn next_threshold(&self, score: f64) -> Option<NextThreshold> {
        let bands = &self.definition.bands;
        let matches = |band: &Band| (band.score - score).abs() < SCORE_EPSILON;

        let (next, boundary) = match self.definition.direction {
            Direction::AscendingBad => {
                let current = bands.iter().rposition(matches)?;
                let next = bands[current + 1..]
                    .iter()
                    .position(|band| band.score > score + SCORE_EPSILON)
                    .map(|offset| current + 1 + offset)?;
                (next, bands[next].min?)
            }
            Direction::DescendingBad => {
                let current = bands.iter().position(matches)?;
                let next = bands[..current]
                    .iter()
                    .rposition(|band| band.score > score + SCORE_EPSILON)?;
                (next, bands[next].max?)
            }
        };

        Some(NextThreshold {
            metric_id: self.definition.id.clone(),
            boundary,
            direction: self.definition.direction.watch(),
            score: bands[next].score,
            label: bands[next].label.clone(),
        })
    }

    fn band_index(&self, value: f64) -> usize {
        self.definition
            .bands
            .partition_point(|band| band.min.map_or(true, |min| min <= value))
            .saturating_sub(1)
    }
}

fn validate_bands(definition: &MetricDefinition) -> Result<(), EngineConfigError> {
    let metric = || definition.id.clone();
    let bands = &definition.bands;

    if bands.is_empty() {
        return Err(EngineConfigError::EmptyBands { metric: metric() });
    }

    let last = bands.len() - 1;
    for (index, band) in bands.iter().enumerate() {
        let finite_bounds = band.min.map_or(true, f64::is_finite)
            && band.max.map_or(true, f64::is_finite)
            && band.score.is_finite();
        let ordered = match (band.min, band.max) {
            (Some(min), Some(max)) => min < max,
            _ => true,
        };
        if !finite_bounds || !ordered {
            return Err(EngineConfigError::InvalidBandBounds {
                metric: metric(),
                index,
            });
        }

        if (index > 0 && band.min.is_none()) || (index < last && band.max.is_none()) {
            return Err(EngineConfigError::UnboundedInteriorBand {
                metric: metric(),
                index,
            });
        }
    }

    for (index, pair) in bands.windows(2).enumerate() {
        let (upper, lower) = match (pair[0].max, pair[1].min) {
            (Some(upper), Some(lower)) => (upper, lower),
            _ => {
                return Err(EngineConfigError::UnboundedInteriorBand {
                    metric: metric(),
                    index,
                })
            }
        };
        if upper < lower {
            return Err(EngineConfigError::BandGap {
                metric: metric(),
                index,
            });
        }
        if upper > lower {
            return Err(EngineConfigError::BandOverlap {
                metric: metric(),
                index,
            });
        }

        let monotonic = match definition.direction {
            Direction::AscendingBad => pair[1].score >= pair[0].score,
            Direction::DescendingBad => pair[1].score <= pair[0].score,
        };
        if !monotonic {
            return Err(EngineConfigError::NonMonotonicBands {
                metric: metric(),
                index: index + 1,
                direction: match definition.direction {
                    Direction::AscendingBad => "ascending",
                    Direction::DescendingBad => "descending",
                },
            });
        }
    }

    if !definition.neutral_score.is_finite() {
        return Err(EngineConfigError::InvalidBandBounds {
            metric: metric(),
            index: 0,
        });
    }

    Ok(())
}

/// Ordered set of primary indicator curves whose weights sum to one.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    curves: Vec<ScoreCurve>,
    index: HashMap<MetricId, usize>,
}

impl MetricCatalog {
    pub fn new(definitions: Vec<MetricDefinition>) -> Result<Self, EngineConfigError> {
        let mut curves = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());

        for definition in definitions {
            if !definition.weight.is_finite() || !(0.0..=1.0).contains(&definition.weight) {
                return Err(EngineConfigError::InvalidWeight {
                    set: ReadingSet::Primary,
                    metric: definition.id,
                    weight: definition.weight,
                });
            }
            if index.contains_key(&definition.id) {
                return Err(EngineConfigError::DuplicateMetric {
                    set: ReadingSet::Primary,
                    metric: definition.id,
                });
            }

            index.insert(definition.id.clone(), curves.len());
            curves.push(ScoreCurve::new(definition)?);
        }

        let total: f64 = curves.iter().map(ScoreCurve::weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineConfigError::WeightSum {
                set: ReadingSet::Primary,
                total,
            });
        }

        Ok(Self { curves, index })
    }

    pub fn curves(&self) -> &[ScoreCurve] {
        &self.curves
    }

    pub fn curve(&self, metric_id: &MetricId) -> Option<&ScoreCurve> {
        self.index.get(metric_id).map(|position| &self.curves[*position])
    }

    pub fn contains(&self, metric_id: &MetricId) -> bool {
        self.index.contains_key(metric_id)
    }

    /// Score a single reading; `None` when the metric is not configured.
    pub fn evaluate(&self, metric_id: &MetricId, value: Option<f64>) -> Option<CurvePoint> {
        self.curve(metric_id).map(|curve| curve.evaluate(value))
    }

    pub fn next_threshold(&self, metric_id: &MetricId, score: f64) -> Option<NextThreshold> {
        self.curve(metric_id)
            .and_then(|curve| curve.next_threshold(score))
    }
}
