use std::collections::HashMap;

use tracing::warn;

use super::domain::{EvaluationWarning, MetricId, MetricReading, ReadingSet};

/// Lookup of the usable readings of one indicator set.
///
/// Unknown identifiers, duplicates and non-finite values are dropped here and
/// surfaced as warnings, so the scoring components only ever see clean data.
#[derive(Debug, Default)]
pub(crate) struct ReadingIndex {
    values: HashMap<MetricId, Option<f64>>,
}

impl ReadingIndex {
    pub(crate) fn build<F>(
        set: ReadingSet,
        readings: &[MetricReading],
        is_known: F,
        warnings: &mut Vec<EvaluationWarning>,
    ) -> Self
    where
        F: Fn(&MetricId) -> bool,
    {
        let mut values = HashMap::with_capacity(readings.len());

        for reading in readings {
            let metric_id = &reading.metric_id;

            if !is_known(metric_id) {
                warn!(set = set.label(), %metric_id, "ignoring unknown metric");
                warnings.push(EvaluationWarning::UnknownMetric {
                    set,
                    metric_id: metric_id.clone(),
                });
                continue;
            }

            if values.contains_key(metric_id) {
                warn!(set = set.label(), %metric_id, "ignoring duplicate reading");
                warnings.push(EvaluationWarning::DuplicateReading {
                    set,
                    metric_id: metric_id.clone(),
                });
                continue;
            }

            if reading.is_non_finite() {
                warn!(set = set.label(), %metric_id, "non-finite reading treated as missing");
                warnings.push(EvaluationWarning::NonFiniteValue {
                    set,
                    metric_id: metric_id.clone(),
                });
            }

            values.insert(metric_id.clone(), reading.observed());
        }

        Self { values }
    }

    pub(crate) fn value(&self, metric_id: &MetricId) -> Option<f64> {
        self.values.get(metric_id).copied().flatten()
    }
}
