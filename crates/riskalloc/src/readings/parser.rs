use serde::{Deserialize, Deserializer};
use std::io::Read;

/// One CSV row, before the set name and value are interpreted.
#[derive(Debug)]
pub(crate) struct ReadingRow {
    pub(crate) line: u64,
    pub(crate) set: String,
    pub(crate) metric: String,
    pub(crate) value: Option<String>,
}

/// Rows of a `set,metric,value` file. Lines starting with `#` are skipped.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<ReadingRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let row: RawRow = record.deserialize(Some(&headers))?;
        if row.metric.is_empty() {
            continue;
        }

        rows.push(ReadingRow {
            line,
            set: row.set,
            metric: row.metric,
            value: row.value,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct RawRow {
    set: String,
    metric: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    value: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
