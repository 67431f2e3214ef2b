use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::Bucket;
use super::error::AllocationError;

/// Tolerance used when checking that a vector sums to 100.
pub const TOTAL_TOLERANCE: f64 = 1e-6;

const FULL_ALLOCATION: f64 = 100.0;

/// Percentage split across every [`Bucket`]; always non-negative and summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationVector(BTreeMap<Bucket, f64>);

impl AllocationVector {
    /// Build a vector from `(bucket, percentage)` pairs, requiring every bucket
    /// exactly once, finite non-negative shares and a total of 100.
    pub fn from_entries<I>(entries: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = (Bucket, f64)>,
    {
        let shares: BTreeMap<Bucket, f64> = entries.into_iter().collect();

        for bucket in Bucket::ALL {
            match shares.get(&bucket) {
                None => return Err(AllocationError::MissingBucket(bucket)),
                Some(value) if !value.is_finite() => {
                    return Err(AllocationError::NonFinite { bucket })
                }
                Some(value) if *value < 0.0 => {
                    return Err(AllocationError::Negative {
                        bucket,
                        value: *value,
                    })
                }
                Some(_) => {}
            }
        }

        let vector = Self(shares);
        let total = vector.total();
        if (total - FULL_ALLOCATION).abs() > TOTAL_TOLERANCE {
            return Err(AllocationError::TotalMismatch { total });
        }

        Ok(vector)
    }

    pub fn get(&self, bucket: Bucket) -> f64 {
        self.0.get(&bucket).copied().unwrap_or_default()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, f64)> + '_ {
        self.0.iter().map(|(bucket, value)| (*bucket, *value))
    }

    /// Whether the vector still honors the sum-to-100 and non-negativity invariant.
    pub fn is_balanced(&self) -> bool {
        (self.total() - FULL_ALLOCATION).abs() <= TOTAL_TOLERANCE
            && self.0.values().all(|value| *value >= 0.0)
    }

    /// Move up to `amount` from `donor` to `recipient`; returns what actually moved.
    pub(crate) fn transfer(&mut self, donor: Bucket, recipient: Bucket, amount: f64) -> f64 {
        let available = self.get(donor);
        let moved = amount.min(available).max(0.0);
        if moved > 0.0 {
            self.0.insert(donor, available - moved);
            *self.0.entry(recipient).or_default() += moved;
        }
        moved
    }

    /// Round every share to `decimals` places and push any drift from 100 onto
    /// the largest bucket (earliest bucket on ties).
    pub(crate) fn normalize(&mut self, decimals: u32) {
        for value in self.0.values_mut() {
            *value = round_to(*value, decimals);
        }

        let residual = FULL_ALLOCATION - self.total();
        if residual.abs() <= f64::EPSILON {
            return;
        }

        let largest = self
            .0
            .iter()
            .fold(None::<(Bucket, f64)>, |best, (bucket, value)| match best {
                Some((_, best_value)) if best_value >= *value => best,
                _ => Some((*bucket, *value)),
            });

        if let Some((bucket, value)) = largest {
            self.0.insert(bucket, round_to(value + residual, decimals));
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_split() -> AllocationVector {
        AllocationVector::from_entries(Bucket::ALL.map(|bucket| (bucket, 20.0)))
            .expect("valid vector")
    }

    #[test]
    fn from_entries_rejects_missing_bucket() {
        let error = AllocationVector::from_entries([
            (Bucket::UsEquity, 50.0),
            (Bucket::IntlEquity, 10.0),
            (Bucket::RealAssets, 10.0),
            (Bucket::Bonds, 30.0),
        ])
        .expect_err("cash missing");
        assert_eq!(error, AllocationError::MissingBucket(Bucket::Cash));
    }

    #[test]
    fn from_entries_rejects_bad_total_and_negative_shares() {
        let short = AllocationVector::from_entries(Bucket::ALL.map(|bucket| (bucket, 19.0)));
        assert!(matches!(short, Err(AllocationError::TotalMismatch { .. })));

        let negative = AllocationVector::from_entries([
            (Bucket::UsEquity, 110.0),
            (Bucket::IntlEquity, -10.0),
            (Bucket::RealAssets, 0.0),
            (Bucket::Bonds, 0.0),
            (Bucket::Cash, 0.0),
        ]);
        assert!(matches!(
            negative,
            Err(AllocationError::Negative {
                bucket: Bucket::IntlEquity,
                ..
            })
        ));
    }

    #[test]
    fn transfer_never_overdraws_the_donor() {
        let mut vector = even_split();
        let moved = vector.transfer(Bucket::Cash, Bucket::Bonds, 35.0);

        assert_eq!(moved, 20.0);
        assert_eq!(vector.get(Bucket::Cash), 0.0);
        assert_eq!(vector.get(Bucket::Bonds), 40.0);
        assert!(vector.is_balanced());
    }

    #[test]
    fn normalize_assigns_residual_to_largest_bucket() {
        let mut vector = even_split();
        vector.transfer(Bucket::Cash, Bucket::UsEquity, 1.0 / 3.0);
        vector.transfer(Bucket::Bonds, Bucket::IntlEquity, 1.0 / 3.0);
        vector.transfer(Bucket::RealAssets, Bucket::UsEquity, 1.0 / 3.0);

        vector.normalize(1);

        assert!(vector.is_balanced(), "total was {}", vector.total());
        assert_eq!(vector.get(Bucket::IntlEquity), 20.3);
        assert_eq!(vector.get(Bucket::Cash), 19.7);
        assert_eq!(vector.get(Bucket::UsEquity), 20.6);
    }
}
