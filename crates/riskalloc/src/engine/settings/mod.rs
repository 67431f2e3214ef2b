mod standard;

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::adjustments::AdjustmentPolicy;
use super::curve::MetricDefinition;
use super::error::EngineConfigError;
use super::favorability::FavorabilityConfig;
use super::matrix::DecisionMatrixConfig;
use super::sentiment::SentimentConfig;
use super::tier::TierBand;

fn default_neutral_composite() -> f64 {
    4.0
}

/// Every table the engine consults, loaded once and validated by
/// [`AllocationEngine::new`](super::AllocationEngine::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_neutral_composite")]
    pub neutral_composite: f64,
    pub metrics: Vec<MetricDefinition>,
    pub tiers: Vec<TierBand>,
    pub favorability: FavorabilityConfig,
    pub sentiment: SentimentConfig,
    pub matrix: DecisionMatrixConfig,
    pub adjustments: AdjustmentPolicy,
}

impl EngineConfig {
    /// Built-in indicator bands, tiers, matrices and rules.
    pub fn standard() -> Self {
        Self {
            neutral_composite: default_neutral_composite(),
            metrics: standard::metrics(),
            tiers: standard::tiers(),
            favorability: standard::favorability(),
            sentiment: standard::sentiment(),
            matrix: standard::matrix(),
            adjustments: standard::adjustments(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, EngineConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EngineConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, EngineConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
