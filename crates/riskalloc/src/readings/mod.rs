//! Imports indicator snapshots from `set,metric,value` CSV files.

mod parser;

use crate::engine::{AllocationProfile, EvaluationRequest, MetricReading, ReadingSet};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum ReadingsImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownSet { line: u64, value: String },
    InvalidValue { line: u64, metric: String, value: String },
}

impl std::fmt::Display for ReadingsImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingsImportError::Io(err) => write!(f, "failed to read readings file: {}", err),
            ReadingsImportError::Csv(err) => write!(f, "invalid readings CSV data: {}", err),
            ReadingsImportError::UnknownSet { line, value } => write!(
                f,
                "line {}: unknown reading set '{}' (expected primary, favorability or sentiment)",
                line, value
            ),
            ReadingsImportError::InvalidValue {
                line,
                metric,
                value,
            } => write!(
                f,
                "line {}: value '{}' for metric '{}' is not a number",
                line, value, metric
            ),
        }
    }
}

impl std::error::Error for ReadingsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReadingsImportError::Io(err) => Some(err),
            ReadingsImportError::Csv(err) => Some(err),
            ReadingsImportError::UnknownSet { .. } | ReadingsImportError::InvalidValue { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for ReadingsImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReadingsImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct ReadingsImporter;

impl ReadingsImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        profile: AllocationProfile,
    ) -> Result<EvaluationRequest, ReadingsImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, profile)
    }

    /// Rows keep file order within each set; an empty value is a missing reading.
    pub fn from_reader<R: Read>(
        reader: R,
        profile: AllocationProfile,
    ) -> Result<EvaluationRequest, ReadingsImportError> {
        let mut request = EvaluationRequest::new(profile);

        for row in parser::parse_rows(reader)? {
            let set: ReadingSet =
                row.set
                    .parse()
                    .map_err(|_| ReadingsImportError::UnknownSet {
                        line: row.line,
                        value: row.set.clone(),
                    })?;

            let reading = match row.value {
                Some(raw) => {
                    let value =
                        raw.trim()
                            .parse::<f64>()
                            .map_err(|_| ReadingsImportError::InvalidValue {
                                line: row.line,
                                metric: row.metric.clone(),
                                value: raw.clone(),
                            })?;
                    MetricReading::new(row.metric, value)
                }
                None => MetricReading::missing(row.metric),
            };

            request.readings_mut(set).push(reading);
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn importer_groups_rows_by_set() {
        let csv = "set,metric,value\n\
primary,market-volatility,18.5\n\
primary,yield-curve,\n\
favorability,treasury-10y,4.6\n\
Sentiment , put-call-ratio , 0.95\n";
        let request = ReadingsImporter::from_reader(Cursor::new(csv), AllocationProfile::Retired)
            .expect("import succeeds");

        assert_eq!(request.profile, AllocationProfile::Retired);
        assert_eq!(
            request.primary,
            vec![
                MetricReading::new("market-volatility", 18.5),
                MetricReading::missing("yield-curve"),
            ]
        );
        assert_eq!(
            request.favorability,
            vec![MetricReading::new("treasury-10y", 4.6)]
        );
        assert_eq!(
            request.sentiment,
            vec![MetricReading::new("put-call-ratio", 0.95)]
        );
    }

    #[test]
    fn importer_skips_comment_lines() {
        let csv = "set,metric,value\n# snapshot of 2024-03-01\nprimary,credit-spread,3.2\n";
        let request = ReadingsImporter::from_reader(Cursor::new(csv), AllocationProfile::MidCareer)
            .expect("import succeeds");
        assert_eq!(request.primary.len(), 1);
    }

    #[test]
    fn importer_reports_unknown_sets_with_line() {
        let csv = "set,metric,value\nprimary,credit-spread,3.2\nmacro,gdp,2.1\n";
        let error = ReadingsImporter::from_reader(Cursor::new(csv), AllocationProfile::MidCareer)
            .expect_err("unknown set");

        match error {
            ReadingsImportError::UnknownSet { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "macro");
            }
            other => panic!("expected unknown set, got {other:?}"),
        }
    }

    #[test]
    fn importer_rejects_unparsable_values() {
        let csv = "set,metric,value\nprimary,credit-spread,wide\n";
        let error = ReadingsImporter::from_reader(Cursor::new(csv), AllocationProfile::MidCareer)
            .expect_err("bad value");

        assert!(matches!(
            error,
            ReadingsImportError::InvalidValue { line: 2, .. }
        ));
        assert!(error.to_string().contains("credit-spread"));
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error =
            ReadingsImporter::from_path("./does-not-exist.csv", AllocationProfile::EarlyCareer)
                .expect_err("expected io error");

        match error {
            ReadingsImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
