use std::path::PathBuf;

use super::domain::{AllocationProfile, Bucket, MetricId, ReadingSet, RiskTier};

/// Problems with an allocation vector's shape or totals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocationError {
    #[error("allocation is missing bucket {0}")]
    MissingBucket(Bucket),
    #[error("allocation for {bucket} is not a finite number")]
    NonFinite { bucket: Bucket },
    #[error("allocation for {bucket} is negative ({value})")]
    Negative { bucket: Bucket, value: f64 },
    #[error("allocation sums to {total}, expected 100")]
    TotalMismatch { total: f64 },
}

/// Raised while loading or validating an [`EngineConfig`](super::EngineConfig).
///
/// Every table is checked once at construction; evaluation never fails.
#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("failed to read engine configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid engine configuration json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("metric {metric} has no bands")]
    EmptyBands { metric: MetricId },
    #[error("metric {metric} band {index} has invalid bounds")]
    InvalidBandBounds { metric: MetricId, index: usize },
    #[error("metric {metric} band {index} is open-ended inside the table")]
    UnboundedInteriorBand { metric: MetricId, index: usize },
    #[error("metric {metric} has a gap between band {index} and the next band")]
    BandGap { metric: MetricId, index: usize },
    #[error("metric {metric} band {index} overlaps the next band")]
    BandOverlap { metric: MetricId, index: usize },
    #[error("metric {metric} band {index} breaks the {direction} score ordering")]
    NonMonotonicBands {
        metric: MetricId,
        index: usize,
        direction: &'static str,
    },
    #[error("metric {metric} score {score} falls outside the composite scale [{min}, {max}]")]
    ScoreOutOfScale {
        metric: MetricId,
        score: f64,
        min: f64,
        max: f64,
    },
    #[error("{set} metric {metric} has invalid weight {weight}")]
    InvalidWeight {
        set: ReadingSet,
        metric: MetricId,
        weight: f64,
    },
    #[error("{set} metric {metric} is configured more than once")]
    DuplicateMetric { set: ReadingSet, metric: MetricId },
    #[error("{set} weights sum to {total}, expected 1.0")]
    WeightSum { set: ReadingSet, total: f64 },

    #[error("tier table is empty")]
    EmptyTiers,
    #[error("tier {tier} has invalid bounds [{min}, {max})")]
    InvalidTierBounds { tier: RiskTier, min: f64, max: f64 },
    #[error("gap between tier {tier} and the next tier")]
    TierGap { tier: RiskTier },
    #[error("tier {tier} overlaps the next tier")]
    TierOverlap { tier: RiskTier },
    #[error("tier {0} is not classifiable")]
    UnclassifiableTier(RiskTier),
    #[error("tier {0} appears more than once")]
    DuplicateTier(RiskTier),
    #[error("tier {0} is missing from the tier table")]
    MissingTier(RiskTier),
    #[error("tier {tier} is out of risk order")]
    TierOrder { tier: RiskTier },
    #[error("neutral composite {value} lies outside the tier domain [{min}, {max}]")]
    NeutralOutOfDomain { value: f64, min: f64, max: f64 },

    #[error("favorability baseline {0} must lie within [0, 100]")]
    InvalidBaseline(f64),
    #[error("rule id {0} is used more than once")]
    DuplicateRule(String),
    #[error("rule {rule} has an invalid {field}")]
    InvalidRuleValue { rule: String, field: &'static str },

    #[error("sentiment signal {signal} needs a finite floor below its ceiling")]
    InvalidSignalRange { signal: MetricId },
    #[error("sentiment level thresholds must ascend within [0, 100]")]
    InvalidSentimentLevels,

    #[error("decision matrix has no entry for {tier}/{profile}")]
    MissingMatrixEntry {
        tier: RiskTier,
        profile: AllocationProfile,
    },
    #[error("decision matrix lists {tier}/{profile} more than once")]
    DuplicateMatrixEntry {
        tier: RiskTier,
        profile: AllocationProfile,
    },
    #[error("decision matrix entry {tier}/{profile} is invalid: {source}")]
    InvalidMatrixEntry {
        tier: RiskTier,
        profile: AllocationProfile,
        source: AllocationError,
    },
    #[error("unknown-tier fallback must be a classified tier, found {0}")]
    InvalidFallback(RiskTier),

    #[error("adjustment priority {priority} is shared by more than one rule")]
    DuplicatePriority { priority: u16 },
    #[error("adjustment rule {rule} moves {bucket} into itself")]
    SelfTransfer { rule: String, bucket: Bucket },
    #[error("adjustment rule {rule} suppresses unknown rule {target}")]
    UnknownSuppressionTarget { rule: String, target: String },
    #[error("adjustment rule {rule} may only suppress lower-priority rules, not {target}")]
    SuppressionOrder { rule: String, target: String },
    #[error("max bucket shift must be a positive number, found {0}")]
    InvalidShiftCap(f64),
    #[error("allocation precision of {0} decimals is not supported")]
    InvalidPrecision(u32),
}
