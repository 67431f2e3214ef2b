use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::allocation::AllocationVector;
use super::domain::{Bucket, RiskTier};
use super::error::EngineConfigError;
use super::sentiment::SentimentLabel;

const MOVE_EPSILON: f64 = 1e-9;
const MAX_DECIMALS: u32 = 6;

fn default_decimals() -> u32 {
    2
}

/// Everything a rule trigger may look at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustmentSignals {
    pub tier: RiskTier,
    pub sub_score: f64,
    pub sentiment: f64,
    pub sentiment_label: SentimentLabel,
}

/// Declarative predicate of an adjustment rule.
///
/// Tier comparisons never match `unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTrigger {
    TierIs { tier: RiskTier },
    TierAtLeast { tier: RiskTier },
    TierAtMost { tier: RiskTier },
    SubScoreAtLeast { value: f64 },
    SubScoreBelow { value: f64 },
    SentimentAtLeast { value: f64 },
    SentimentBelow { value: f64 },
    SentimentIs { label: SentimentLabel },
    AllOf { triggers: Vec<RuleTrigger> },
}

impl RuleTrigger {
    pub fn matches(&self, signals: &AdjustmentSignals) -> bool {
        match self {
            RuleTrigger::TierIs { tier } => signals.tier == *tier && tier.rank().is_some(),
            RuleTrigger::TierAtLeast { tier } => {
                matches!((signals.tier.rank(), tier.rank()), (Some(actual), Some(bound)) if actual >= bound)
            }
            RuleTrigger::TierAtMost { tier } => {
                matches!((signals.tier.rank(), tier.rank()), (Some(actual), Some(bound)) if actual <= bound)
            }
            RuleTrigger::SubScoreAtLeast { value } => signals.sub_score >= *value,
            RuleTrigger::SubScoreBelow { value } => signals.sub_score < *value,
            RuleTrigger::SentimentAtLeast { value } => signals.sentiment >= *value,
            RuleTrigger::SentimentBelow { value } => signals.sentiment < *value,
            RuleTrigger::SentimentIs { label } => signals.sentiment_label == *label,
            RuleTrigger::AllOf { triggers } => {
                triggers.iter().all(|trigger| trigger.matches(signals))
            }
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            RuleTrigger::SubScoreAtLeast { value }
            | RuleTrigger::SubScoreBelow { value }
            | RuleTrigger::SentimentAtLeast { value }
            | RuleTrigger::SentimentBelow { value } => value.is_finite(),
            RuleTrigger::AllOf { triggers } => {
                !triggers.is_empty() && triggers.iter().all(RuleTrigger::is_valid)
            }
            RuleTrigger::TierIs { .. }
            | RuleTrigger::TierAtLeast { .. }
            | RuleTrigger::TierAtMost { .. }
            | RuleTrigger::SentimentIs { .. } => true,
        }
    }
}

/// Moves up to `amount` points from `donor` to `recipient` when `trigger` holds.
///
/// Lower `priority` runs first. `suppresses` names lower-priority rules that
/// must not run in a cycle where this rule fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRule {
    pub id: String,
    pub priority: u16,
    pub trigger: RuleTrigger,
    pub donor: Bucket,
    pub recipient: Bucket,
    pub amount: f64,
    #[serde(default)]
    pub suppresses: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPolicy {
    /// Largest net change any bucket may see from its base value per cycle.
    pub max_bucket_shift: f64,
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    pub rules: Vec<AdjustmentRule>,
}

/// Outcome of a rule whose trigger matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdjustmentStatus {
    Applied,
    /// Moved less than requested (donor balance or bucket shift cap).
    Capped,
    /// Nothing could move.
    Exhausted,
    Suppressed { by: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentRecord {
    pub rule_id: String,
    pub donor: Bucket,
    pub recipient: Bucket,
    pub requested: f64,
    pub moved: f64,
    #[serde(flatten)]
    pub status: AdjustmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedAllocation {
    pub allocation: AllocationVector,
    pub trail: Vec<AdjustmentRecord>,
}

/// Interprets the rule table against a base vector.
#[derive(Debug, Clone)]
pub struct AdjustmentStack {
    rules: Vec<AdjustmentRule>,
    max_bucket_shift: f64,
    decimals: u32,
}

impl AdjustmentStack {
    pub fn new(policy: AdjustmentPolicy) -> Result<Self, EngineConfigError> {
        if !policy.max_bucket_shift.is_finite() || policy.max_bucket_shift <= 0.0 {
            return Err(EngineConfigError::InvalidShiftCap(policy.max_bucket_shift));
        }
        if policy.decimals > MAX_DECIMALS {
            return Err(EngineConfigError::InvalidPrecision(policy.decimals));
        }

        let mut rules = policy.rules;
        rules.sort_by_key(|rule| rule.priority);

        let mut ids = HashSet::new();
        let mut priorities = HashSet::new();
        for rule in &rules {
            if !ids.insert(rule.id.as_str()) {
                return Err(EngineConfigError::DuplicateRule(rule.id.clone()));
            }
            if !priorities.insert(rule.priority) {
                return Err(EngineConfigError::DuplicatePriority {
                    priority: rule.priority,
                });
            }
            if rule.donor == rule.recipient {
                return Err(EngineConfigError::SelfTransfer {
                    rule: rule.id.clone(),
                    bucket: rule.donor,
                });
            }
            if !rule.amount.is_finite() || rule.amount <= 0.0 {
                return Err(EngineConfigError::InvalidRuleValue {
                    rule: rule.id.clone(),
                    field: "amount",
                });
            }
            if !rule.trigger.is_valid() {
                return Err(EngineConfigError::InvalidRuleValue {
                    rule: rule.id.clone(),
                    field: "trigger",
                });
            }
        }

        let priority_of: HashMap<&str, u16> = rules
            .iter()
            .map(|rule| (rule.id.as_str(), rule.priority))
            .collect();
        for rule in &rules {
            for target in &rule.suppresses {
                match priority_of.get(target.as_str()) {
                    None => {
                        return Err(EngineConfigError::UnknownSuppressionTarget {
                            rule: rule.id.clone(),
                            target: target.clone(),
                        })
                    }
                    Some(priority) if *priority <= rule.priority => {
                        return Err(EngineConfigError::SuppressionOrder {
                            rule: rule.id.clone(),
                            target: target.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Self {
            rules,
            max_bucket_shift: policy.max_bucket_shift,
            decimals: policy.decimals,
        })
    }

    /// Rules in application order.
    pub fn rules(&self) -> &[AdjustmentRule] {
        &self.rules
    }

    pub fn max_bucket_shift(&self) -> f64 {
        self.max_bucket_shift
    }

    pub fn apply(&self, base: &AllocationVector, signals: &AdjustmentSignals) -> AdjustedAllocation {
        let mut allocation = base.clone();
        let mut shifts: BTreeMap<Bucket, f64> = BTreeMap::new();
        let mut suppressed_by: HashMap<&str, &str> = HashMap::new();
        let mut trail = Vec::new();

        for rule in &self.rules {
            if !rule.trigger.matches(signals) {
                continue;
            }

            if let Some(suppressor) = suppressed_by.get(rule.id.as_str()) {
                trail.push(AdjustmentRecord {
                    rule_id: rule.id.clone(),
                    donor: rule.donor,
                    recipient: rule.recipient,
                    requested: rule.amount,
                    moved: 0.0,
                    status: AdjustmentStatus::Suppressed {
                        by: suppressor.to_string(),
                    },
                });
                continue;
            }

            for target in &rule.suppresses {
                suppressed_by
                    .entry(target.as_str())
                    .or_insert(rule.id.as_str());
            }

            let donor_shift = shifts.get(&rule.donor).copied().unwrap_or_default();
            let recipient_shift = shifts.get(&rule.recipient).copied().unwrap_or_default();
            let donor_room = self.max_bucket_shift + donor_shift;
            let recipient_room = self.max_bucket_shift - recipient_shift;
            let allowed = rule.amount.min(donor_room).min(recipient_room).max(0.0);

            let moved = allocation.transfer(rule.donor, rule.recipient, allowed);
            *shifts.entry(rule.donor).or_default() -= moved;
            *shifts.entry(rule.recipient).or_default() += moved;

            let status = if moved <= MOVE_EPSILON {
                AdjustmentStatus::Exhausted
            } else if moved + MOVE_EPSILON < rule.amount {
                AdjustmentStatus::Capped
            } else {
                AdjustmentStatus::Applied
            };

            trail.push(AdjustmentRecord {
                rule_id: rule.id.clone(),
                donor: rule.donor,
                recipient: rule.recipient,
                requested: rule.amount,
                moved,
                status,
            });
        }

        allocation.normalize(self.decimals);

        AdjustedAllocation { allocation, trail }
    }
}
