//! Composite risk scoring and rule-driven allocation.
//!
//! The pipeline runs readings through score curves, a weighted composite and
//! the tier classifier, looks up the base allocation for the tier and the
//! caller's profile, then lets the adjustment stack shift percentage between
//! buckets using the favorability sub-score and the sentiment composite.
//! All tables come from one [`EngineConfig`] validated at construction;
//! [`AllocationEngine::evaluate`] is pure and cannot fail.

pub mod adjustments;
pub mod allocation;
pub mod composite;
pub mod curve;
pub mod domain;
pub mod error;
pub mod favorability;
mod inputs;
pub mod matrix;
pub mod router;
pub mod sentiment;
mod settings;
pub mod tier;

#[cfg(test)]
mod tests;

pub use adjustments::{
    AdjustedAllocation, AdjustmentPolicy, AdjustmentRecord, AdjustmentRule, AdjustmentSignals,
    AdjustmentStack, AdjustmentStatus, RuleTrigger,
};
pub use allocation::AllocationVector;
pub use composite::{CompositeAggregator, CompositeScore, ScoredMetric};
pub use curve::{Band, CurvePoint, MetricCatalog, MetricDefinition, NextThreshold, ScoreCurve};
pub use domain::{
    AllocationProfile, Bucket, Direction, EvaluationWarning, MetricId, MetricReading, ReadingSet,
    RiskTier, WatchDirection,
};
pub use error::{AllocationError, EngineConfigError};
pub use favorability::{
    Comparison, FavorabilityConfig, FavorabilityEngine, FavorabilityRule, FiredRule, SubScore,
};
pub use matrix::{DecisionMatrix, DecisionMatrixConfig, MatrixEntry};
pub use router::allocation_router;
pub use sentiment::{
    SentimentComponent, SentimentConfig, SentimentEngine, SentimentLabel, SentimentLevels,
    SentimentScore, SentimentSignal,
};
pub use settings::EngineConfig;
pub use tier::{TierBand, TierTable};

use inputs::ReadingIndex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Readings for one evaluation cycle plus the caller's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub profile: AllocationProfile,
    #[serde(default)]
    pub primary: Vec<MetricReading>,
    #[serde(default)]
    pub favorability: Vec<MetricReading>,
    #[serde(default)]
    pub sentiment: Vec<MetricReading>,
}

impl EvaluationRequest {
    pub fn new(profile: AllocationProfile) -> Self {
        Self {
            profile,
            primary: Vec::new(),
            favorability: Vec::new(),
            sentiment: Vec::new(),
        }
    }

    pub fn readings_mut(&mut self, set: ReadingSet) -> &mut Vec<MetricReading> {
        match set {
            ReadingSet::Primary => &mut self.primary,
            ReadingSet::Favorability => &mut self.favorability,
            ReadingSet::Sentiment => &mut self.sentiment,
        }
    }
}

/// Everything one evaluation produced, in pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub profile: AllocationProfile,
    pub composite: CompositeScore,
    pub sub_score: SubScore,
    pub sentiment: SentimentScore,
    pub base_allocation: AllocationVector,
    pub allocation: AllocationVector,
    pub adjustments: Vec<AdjustmentRecord>,
    pub watchlist: Vec<NextThreshold>,
    pub warnings: Vec<EvaluationWarning>,
}

/// Stateless evaluator over an immutable, validated configuration.
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    catalog: MetricCatalog,
    aggregator: CompositeAggregator,
    tiers: TierTable,
    favorability: FavorabilityEngine,
    sentiment: SentimentEngine,
    matrix: DecisionMatrix,
    stack: AdjustmentStack,
}

impl AllocationEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineConfigError> {
        let tiers = TierTable::new(config.tiers)?;
        let (min, max) = tiers.domain();

        if !tiers.contains(config.neutral_composite) {
            return Err(EngineConfigError::NeutralOutOfDomain {
                value: config.neutral_composite,
                min,
                max,
            });
        }

        let catalog = MetricCatalog::new(config.metrics)?;
        for curve in catalog.curves() {
            let scores = curve
                .bands()
                .iter()
                .map(|band| band.score)
                .chain(std::iter::once(curve.neutral_score()));
            for score in scores {
                if !tiers.contains(score) {
                    return Err(EngineConfigError::ScoreOutOfScale {
                        metric: curve.id().clone(),
                        score,
                        min,
                        max,
                    });
                }
            }
        }

        Ok(Self {
            catalog,
            aggregator: CompositeAggregator::new(config.neutral_composite),
            tiers,
            favorability: FavorabilityEngine::new(config.favorability)?,
            sentiment: SentimentEngine::new(config.sentiment)?,
            matrix: DecisionMatrix::new(config.matrix)?,
            stack: AdjustmentStack::new(config.adjustments)?,
        })
    }

    pub fn standard() -> Result<Self, EngineConfigError> {
        Self::new(EngineConfig::standard())
    }

    pub fn catalog(&self) -> &MetricCatalog {
        &self.catalog
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn matrix(&self) -> &DecisionMatrix {
        &self.matrix
    }

    pub fn stack(&self) -> &AdjustmentStack {
        &self.stack
    }

    pub fn favorability(&self) -> &FavorabilityEngine {
        &self.favorability
    }

    pub fn sentiment(&self) -> &SentimentEngine {
        &self.sentiment
    }

    /// Score one primary reading; `None` for an unconfigured metric.
    pub fn score_metric(&self, metric_id: &MetricId, value: Option<f64>) -> Option<CurvePoint> {
        self.catalog.evaluate(metric_id, value)
    }

    pub fn next_threshold(&self, metric_id: &MetricId, score: f64) -> Option<NextThreshold> {
        self.catalog.next_threshold(metric_id, score)
    }

    pub fn classify(&self, composite: f64) -> RiskTier {
        self.tiers.classify(composite)
    }

    /// Primary composite for a set of readings. Ignored inputs come back
    /// as warnings, the same way [`evaluate`](Self::evaluate) reports them.
    pub fn composite(
        &self,
        readings: &[MetricReading],
    ) -> (CompositeScore, Vec<EvaluationWarning>) {
        let mut warnings = Vec::new();
        let index = ReadingIndex::build(
            ReadingSet::Primary,
            readings,
            |metric_id| self.catalog.contains(metric_id),
            &mut warnings,
        );
        (self.composite_from(&index), warnings)
    }

    pub fn evaluate(&self, request: &EvaluationRequest) -> EvaluationReport {
        let mut warnings = Vec::new();

        let primary = ReadingIndex::build(
            ReadingSet::Primary,
            &request.primary,
            |metric_id| self.catalog.contains(metric_id),
            &mut warnings,
        );
        let favorability = ReadingIndex::build(
            ReadingSet::Favorability,
            &request.favorability,
            |metric_id| self.favorability.knows(metric_id),
            &mut warnings,
        );
        let sentiment = ReadingIndex::build(
            ReadingSet::Sentiment,
            &request.sentiment,
            |metric_id| self.sentiment.knows(metric_id),
            &mut warnings,
        );

        let composite = self.composite_from(&primary);
        debug!(
            composite = composite.value,
            tier = composite.tier.label(),
            observed = composite.observed_count(),
            "scored primary indicators"
        );

        let sub_score = self.favorability.evaluate_index(&favorability);
        let sentiment = self.sentiment.evaluate_index(&sentiment);
        debug!(
            sub_score = sub_score.value,
            sentiment = sentiment.value,
            sentiment_label = sentiment.label.label(),
            "scored secondary engines"
        );

        let base_allocation = self
            .matrix
            .base_allocation(composite.tier, request.profile)
            .clone();
        let signals = AdjustmentSignals {
            tier: composite.tier,
            sub_score: sub_score.value,
            sentiment: sentiment.value,
            sentiment_label: sentiment.label,
        };
        let adjusted = self.stack.apply(&base_allocation, &signals);
        debug!(
            fired = adjusted.trail.len(),
            profile = request.profile.label(),
            "applied adjustment stack"
        );

        let watchlist = composite
            .breakdown
            .iter()
            .filter(|metric| metric.observed)
            .filter_map(|metric| self.catalog.next_threshold(&metric.metric_id, metric.score))
            .collect();

        EvaluationReport {
            profile: request.profile,
            composite,
            sub_score,
            sentiment,
            base_allocation,
            allocation: adjusted.allocation,
            adjustments: adjusted.trail,
            watchlist,
            warnings,
        }
    }

    fn composite_from(&self, readings: &ReadingIndex) -> CompositeScore {
        let scored = composite::score_metrics(&self.catalog, readings);
        self.aggregator.aggregate(scored, &self.tiers)
    }
}
