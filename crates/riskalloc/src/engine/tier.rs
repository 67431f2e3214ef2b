use serde::{Deserialize, Serialize};

use super::domain::RiskTier;
use super::error::EngineConfigError;

/// Composite-scale interval `[min, max)` for one tier; the last band is closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBand {
    pub tier: RiskTier,
    pub min: f64,
    pub max: f64,
}

impl TierBand {
    pub fn new(tier: RiskTier, min: f64, max: f64) -> Self {
        Self { tier, min, max }
    }
}

/// The one tier classifier. Everything that needs a tier label calls `classify`.
#[derive(Debug, Clone)]
pub struct TierTable {
    bands: Vec<TierBand>,
}

impl TierTable {
    /// Accepts bands in ascending risk order that partition the composite
    /// scale without gaps or overlaps and cover every classified tier once.
    pub fn new(bands: Vec<TierBand>) -> Result<Self, EngineConfigError> {
        if bands.is_empty() {
            return Err(EngineConfigError::EmptyTiers);
        }

        for band in &bands {
            if band.tier == RiskTier::Unknown {
                return Err(EngineConfigError::UnclassifiableTier(band.tier));
            }
            if !band.min.is_finite() || !band.max.is_finite() || band.min >= band.max {
                return Err(EngineConfigError::InvalidTierBounds {
                    tier: band.tier,
                    min: band.min,
                    max: band.max,
                });
            }
        }

        for pair in bands.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            if next.tier == current.tier {
                return Err(EngineConfigError::DuplicateTier(next.tier));
            }
            if next.tier.rank() <= current.tier.rank() {
                return Err(EngineConfigError::TierOrder { tier: next.tier });
            }
            if current.max < next.min {
                return Err(EngineConfigError::TierGap { tier: current.tier });
            }
            if current.max > next.min {
                return Err(EngineConfigError::TierOverlap { tier: current.tier });
            }
        }

        if let Some(missing) = RiskTier::CLASSIFIED
            .into_iter()
            .find(|tier| !bands.iter().any(|band| band.tier == *tier))
        {
            return Err(EngineConfigError::MissingTier(missing));
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[TierBand] {
        &self.bands
    }

    /// Lower and upper bound of the composite scale.
    pub fn domain(&self) -> (f64, f64) {
        let first = self.bands[0];
        let last = self.bands[self.bands.len() - 1];
        (first.min, last.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        let (min, max) = self.domain();
        (min..=max).contains(&value)
    }

    /// Map a composite value to its tier. NaN is `Unknown`; values outside
    /// the scale clamp to the first or last tier.
    pub fn classify(&self, value: f64) -> RiskTier {
        if value.is_nan() {
            return RiskTier::Unknown;
        }

        let index = self
            .bands
            .partition_point(|band| band.min <= value)
            .saturating_sub(1);
        self.bands[index].tier
    }

    pub fn band_for(&self, tier: RiskTier) -> Option<&TierBand> {
        self.bands.iter().find(|band| band.tier == tier)
    }
}
