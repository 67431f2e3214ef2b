use super::common::*;
use crate::engine::{
    AllocationError, AllocationProfile, Bucket, DecisionMatrix, EngineConfigError, RiskTier,
};

#[test]
fn every_matrix_entry_is_a_full_allocation() {
    let engine = engine();

    for tier in RiskTier::CLASSIFIED {
        for profile in AllocationProfile::ALL {
            let base = engine.matrix().base_allocation(tier, profile);
            assert!(base.is_balanced(), "{tier}/{profile} sums to {}", base.total());
            assert_eq!(base.iter().count(), Bucket::ALL.len());
        }
    }
}

#[test]
fn balanced_mid_career_row() {
    let engine = engine();
    let base = engine
        .matrix()
        .base_allocation(RiskTier::Balanced, AllocationProfile::MidCareer);

    assert_eq!(base, &vector([35.0, 10.0, 10.0, 35.0, 10.0]));
}

#[test]
fn unknown_tier_uses_the_fallback_row() {
    let engine = engine();
    let matrix = engine.matrix();

    assert_eq!(matrix.unknown_fallback(), RiskTier::Balanced);
    for profile in AllocationProfile::ALL {
        assert_eq!(
            matrix.base_allocation(RiskTier::Unknown, profile),
            matrix.base_allocation(RiskTier::Balanced, profile)
        );
    }
}

#[test]
fn riskier_tiers_never_hold_more_us_equity() {
    let engine = engine();

    for profile in AllocationProfile::ALL {
        let equity: Vec<f64> = RiskTier::CLASSIFIED
            .into_iter()
            .map(|tier| {
                engine
                    .matrix()
                    .base_allocation(tier, profile)
                    .get(Bucket::UsEquity)
            })
            .collect();
        assert!(
            equity.windows(2).all(|pair| pair[0] >= pair[1]),
            "{profile}: {equity:?}"
        );
    }
}

#[test]
fn rejects_missing_and_duplicate_entries() {
    let mut config = standard_config().matrix;
    config.entries.retain(|entry| {
        !(entry.tier == RiskTier::Cautious && entry.profile == AllocationProfile::Retired)
    });
    assert!(matches!(
        DecisionMatrix::new(config),
        Err(EngineConfigError::MissingMatrixEntry {
            tier: RiskTier::Cautious,
            profile: AllocationProfile::Retired,
        })
    ));

    let mut config = standard_config().matrix;
    let copy = config.entries[0].clone();
    config.entries.push(copy);
    assert!(matches!(
        DecisionMatrix::new(config),
        Err(EngineConfigError::DuplicateMatrixEntry { .. })
    ));
}

#[test]
fn rejects_entries_that_do_not_sum_to_one_hundred() {
    let mut config = standard_config().matrix;
    config.entries[3].allocation.insert(Bucket::Cash, 40.0);

    match DecisionMatrix::new(config) {
        Err(EngineConfigError::InvalidMatrixEntry { source, .. }) => {
            assert!(matches!(source, AllocationError::TotalMismatch { .. }))
        }
        other => panic!("expected invalid entry, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_as_fallback_or_entry_tier() {
    let mut config = standard_config().matrix;
    config.unknown_fallback = RiskTier::Unknown;
    assert!(matches!(
        DecisionMatrix::new(config),
        Err(EngineConfigError::InvalidFallback(RiskTier::Unknown))
    ));

    let mut config = standard_config().matrix;
    config.entries[0].tier = RiskTier::Unknown;
    assert!(matches!(
        DecisionMatrix::new(config),
        Err(EngineConfigError::UnclassifiableTier(RiskTier::Unknown))
    ));
}
