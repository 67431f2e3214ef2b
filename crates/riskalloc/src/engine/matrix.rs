use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::allocation::AllocationVector;
use super::domain::{AllocationProfile, Bucket, RiskTier};
use super::error::EngineConfigError;

fn default_unknown_fallback() -> RiskTier {
    RiskTier::Balanced
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub tier: RiskTier,
    pub profile: AllocationProfile,
    pub allocation: BTreeMap<Bucket, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrixConfig {
    /// Row used when the composite tier is `unknown`.
    #[serde(default = "default_unknown_fallback")]
    pub unknown_fallback: RiskTier,
    pub entries: Vec<MatrixEntry>,
}

/// Base allocation per (tier, profile), fully populated and validated on load.
#[derive(Debug, Clone)]
pub struct DecisionMatrix {
    rows: Vec<AllocationVector>,
    unknown_fallback: RiskTier,
}

impl DecisionMatrix {
    pub fn new(config: DecisionMatrixConfig) -> Result<Self, EngineConfigError> {
        if config.unknown_fallback.rank().is_none() {
            return Err(EngineConfigError::InvalidFallback(config.unknown_fallback));
        }

        let mut seen = HashSet::new();
        for entry in &config.entries {
            if entry.tier.rank().is_none() {
                return Err(EngineConfigError::UnclassifiableTier(entry.tier));
            }
            if !seen.insert((entry.tier, entry.profile)) {
                return Err(EngineConfigError::DuplicateMatrixEntry {
                    tier: entry.tier,
                    profile: entry.profile,
                });
            }
        }

        let mut rows = Vec::with_capacity(RiskTier::CLASSIFIED.len() * AllocationProfile::ALL.len());
        for tier in RiskTier::CLASSIFIED {
            for profile in AllocationProfile::ALL {
                let entry = config
                    .entries
                    .iter()
                    .find(|entry| entry.tier == tier && entry.profile == profile)
                    .ok_or(EngineConfigError::MissingMatrixEntry { tier, profile })?;

                let vector = AllocationVector::from_entries(entry.allocation.clone()).map_err(
                    |source| EngineConfigError::InvalidMatrixEntry {
                        tier,
                        profile,
                        source,
                    },
                )?;
                rows.push(vector);
            }
        }

        Ok(Self {
            rows,
            unknown_fallback: config.unknown_fallback,
        })
    }

    pub fn unknown_fallback(&self) -> RiskTier {
        self.unknown_fallback
    }

    pub fn base_allocation(&self, tier: RiskTier, profile: AllocationProfile) -> &AllocationVector {
        let tier = match tier.rank() {
            Some(_) => tier,
            None => self.unknown_fallback,
        };
        &self.rows[Self::position(tier, profile)]
    }

    fn position(tier: RiskTier, profile: AllocationProfile) -> usize {
        let tier_index = tier.rank().map(usize::from).unwrap_or_default();
        let profile_index = AllocationProfile::ALL
            .iter()
            .position(|candidate| *candidate == profile)
            .unwrap_or_default();
        tier_index * AllocationProfile::ALL.len() + profile_index
    }
}
