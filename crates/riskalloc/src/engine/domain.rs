use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a configured indicator, e.g. `market-volatility`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(pub String);

impl MetricId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MetricId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raw indicator value as supplied by the caller. `None` marks a missing reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub metric_id: MetricId,
    #[serde(default)]
    pub value: Option<f64>,
}

impl MetricReading {
    pub fn new(metric_id: impl Into<String>, value: f64) -> Self {
        Self {
            metric_id: MetricId::new(metric_id),
            value: Some(value),
        }
    }

    pub fn missing(metric_id: impl Into<String>) -> Self {
        Self {
            metric_id: MetricId::new(metric_id),
            value: None,
        }
    }

    /// The reading's value if it is present and finite.
    pub fn observed(&self) -> Option<f64> {
        self.value.filter(|value| value.is_finite())
    }

    pub(crate) fn is_non_finite(&self) -> bool {
        matches!(self.value, Some(value) if !value.is_finite())
    }
}

/// Which way a raw value has to move for the indicator to signal more risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AscendingBad,
    DescendingBad,
}

impl Direction {
    pub const fn watch(self) -> WatchDirection {
        match self {
            Direction::AscendingBad => WatchDirection::Rising,
            Direction::DescendingBad => WatchDirection::Falling,
        }
    }
}

/// Movement of the raw value that would cross the next less favorable boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchDirection {
    Rising,
    Falling,
}

impl WatchDirection {
    pub const fn label(self) -> &'static str {
        match self {
            WatchDirection::Rising => "value rising",
            WatchDirection::Falling => "value falling",
        }
    }
}

/// Ordered risk tier derived from the composite score.
///
/// `Unknown` sits outside the ordering and is only produced when no primary
/// reading was available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Excellent,
    Favorable,
    Balanced,
    Cautious,
    Defensive,
    Unknown,
}

impl RiskTier {
    /// Every tier a composite value can classify into, least risky first.
    pub const CLASSIFIED: [RiskTier; 5] = [
        RiskTier::Excellent,
        RiskTier::Favorable,
        RiskTier::Balanced,
        RiskTier::Cautious,
        RiskTier::Defensive,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::Excellent => "excellent",
            RiskTier::Favorable => "favorable",
            RiskTier::Balanced => "balanced",
            RiskTier::Cautious => "cautious",
            RiskTier::Defensive => "defensive",
            RiskTier::Unknown => "unknown",
        }
    }

    /// Position on the risk ladder; `None` for `Unknown`.
    pub const fn rank(self) -> Option<u8> {
        match self {
            RiskTier::Excellent => Some(0),
            RiskTier::Favorable => Some(1),
            RiskTier::Balanced => Some(2),
            RiskTier::Cautious => Some(3),
            RiskTier::Defensive => Some(4),
            RiskTier::Unknown => None,
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caller-selected row of the decision matrix (investment horizon).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationProfile {
    EarlyCareer,
    MidCareer,
    PreRetirement,
    Retired,
}

impl AllocationProfile {
    pub const ALL: [AllocationProfile; 4] = [
        AllocationProfile::EarlyCareer,
        AllocationProfile::MidCareer,
        AllocationProfile::PreRetirement,
        AllocationProfile::Retired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AllocationProfile::EarlyCareer => "early-career",
            AllocationProfile::MidCareer => "mid-career",
            AllocationProfile::PreRetirement => "pre-retirement",
            AllocationProfile::Retired => "retired",
        }
    }
}

impl fmt::Display for AllocationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AllocationProfile {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|profile| profile.label() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown allocation profile '{value}' (expected one of: {})",
                    Self::ALL.map(AllocationProfile::label).join(", ")
                )
            })
    }
}

/// Named slice of the allocation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    UsEquity,
    IntlEquity,
    RealAssets,
    Bonds,
    Cash,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::UsEquity,
        Bucket::IntlEquity,
        Bucket::RealAssets,
        Bucket::Bonds,
        Bucket::Cash,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Bucket::UsEquity => "us_equity",
            Bucket::IntlEquity => "intl_equity",
            Bucket::RealAssets => "real_assets",
            Bucket::Bonds => "bonds",
            Bucket::Cash => "cash",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three independent indicator sets a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSet {
    Primary,
    Favorability,
    Sentiment,
}

impl ReadingSet {
    pub const fn label(self) -> &'static str {
        match self {
            ReadingSet::Primary => "primary",
            ReadingSet::Favorability => "favorability",
            ReadingSet::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for ReadingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingSet {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "favorability" => Ok(Self::Favorability),
            "sentiment" => Ok(Self::Sentiment),
            other => Err(format!("unknown reading set '{other}'")),
        }
    }
}

/// Input problems that were tolerated during an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationWarning {
    UnknownMetric { set: ReadingSet, metric_id: MetricId },
    DuplicateReading { set: ReadingSet, metric_id: MetricId },
    NonFiniteValue { set: ReadingSet, metric_id: MetricId },
}

impl EvaluationWarning {
    pub fn summary(&self) -> String {
        match self {
            EvaluationWarning::UnknownMetric { set, metric_id } => {
                format!("ignored unknown {} metric '{}'", set.label(), metric_id)
            }
            EvaluationWarning::DuplicateReading { set, metric_id } => format!(
                "ignored duplicate {} reading for '{}'",
                set.label(),
                metric_id
            ),
            EvaluationWarning::NonFiniteValue { set, metric_id } => format!(
                "treated non-finite {} reading for '{}' as missing",
                set.label(),
                metric_id
            ),
        }
    }
}
