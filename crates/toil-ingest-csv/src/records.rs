//! Tabular record source: delimited files with a header row.

use crate::IngestError;
use std::collections::BTreeMap;
use std::path::Path;

/// One row from a tabular source: column name → value.
///
/// Absent columns and empty cells are both treated as null, matching how
/// the upstream exports represent missing values.
#[derive(Debug, Clone)]
pub struct Record {
    row: usize,
    values: BTreeMap<String, String>,
}

impl Record {
    /// Build a record from column/value pairs. Empty values are dropped,
    /// as they are when reading from a file. `row` is the 1-based data row
    /// used in error messages.
    pub fn from_pairs(row: usize, pairs: &[(&str, &str)]) -> Self {
        let values = pairs
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        Self { row, values }
    }

    /// The value of a column, if present and non-empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    /// 1-based data row this record came from.
    pub fn row(&self) -> usize {
        self.row
    }
}

/// Read a comma-delimited file with a header row into records, in row
/// order.
///
/// Fails with [`IngestError::SourceFormat`] if the file cannot be opened
/// or parsed, or if the header lacks any of `required`. Re-reading means
/// calling this again; the file is re-opened each time.
pub fn read_records(path: &Path, required: &[&str]) -> Result<Vec<Record>, IngestError> {
    let source_format = |message: String| IngestError::SourceFormat {
        source_path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|e| source_format(e.to_string()))?;
    let headers = reader
        .headers()
        .map_err(|e| source_format(e.to_string()))?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(source_format(format!(
                "missing required column `{column}` in header"
            )));
        }
    }

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let raw = result.map_err(|e| source_format(e.to_string()))?;
        let values = headers
            .iter()
            .zip(raw.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        records.push(Record {
            row: i + 1,
            values,
        });
    }
    Ok(records)
}

/// Drop records for which any required column is null, preserving order.
pub fn filter_eligible(records: Vec<Record>, required: &[&str]) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| required.iter().all(|column| record.get(column).is_some()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write csv");
        path
    }

    #[test]
    fn reads_rows_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "occupations.csv",
            "conceptUri,preferredLabel\nhttp://example.org/1,first\nhttp://example.org/2,second\n",
        );

        let records = read_records(&path, &["conceptUri"]).expect("read");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("preferredLabel"), Some("first"));
        assert_eq!(records[1].get("preferredLabel"), Some("second"));
        assert_eq!(records[1].row(), 2);
    }

    #[test]
    fn empty_cells_are_null() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "skills.csv",
            "conceptUri,skillType\nhttp://example.org/1,\n",
        );

        let records = read_records(&path, &["conceptUri"]).expect("read");
        assert_eq!(records[0].get("skillType"), None);
        assert_eq!(records[0].get("conceptUri"), Some("http://example.org/1"));
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            &dir,
            "occupations.csv",
            "conceptUri,description\nhttp://example.org/1,\"plans, directs and coordinates\"\n",
        );

        let records = read_records(&path, &["conceptUri"]).expect("read");
        assert_eq!(
            records[0].get("description"),
            Some("plans, directs and coordinates")
        );
    }

    #[test]
    fn missing_required_header_is_source_format_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(&dir, "bad.csv", "uri,label\nhttp://example.org/1,x\n");

        let err = read_records(&path, &["conceptUri"]).expect_err("should fail");
        assert!(matches!(err, IngestError::SourceFormat { .. }));
    }

    #[test]
    fn unreadable_file_is_source_format_error() {
        let err = read_records(Path::new("/nonexistent/input.csv"), &["conceptUri"])
            .expect_err("should fail");
        assert!(matches!(err, IngestError::SourceFormat { .. }));
    }

    #[test]
    fn filter_drops_records_missing_required_columns() {
        let records = vec![
            Record::from_pairs(1, &[("occupationUri", "http://example.org/o1"), ("skillUri", "http://example.org/s1")]),
            Record::from_pairs(2, &[("occupationUri", "http://example.org/o2"), ("skillUri", "")]),
            Record::from_pairs(3, &[("skillUri", "http://example.org/s3")]),
        ];

        let eligible = filter_eligible(records, &["occupationUri", "skillUri"]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].row(), 1);
    }
}
