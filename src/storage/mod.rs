// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::pipeline::ExtractionReport;
use crate::extractors::records::ContributionRecord;
use crate::utils::error::StorageError;

/// Text written in place of a field that could not be resolved.
pub const NOT_FOUND: &str = "No Data";

pub const CSV_HEADERS: [&str; 9] = [
    "Date",
    "Contributor Name",
    "Address",
    "City",
    "State",
    "Zip",
    "Occupation",
    "Employer",
    "Amount",
];

/// A record with every absent field rendered as [`NOT_FOUND`].
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    date: &'a str,
    contributor_name: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    zip: &'a str,
    occupation: &'a str,
    employer: &'a str,
    amount: &'a str,
}

impl<'a> From<&'a ContributionRecord> for OutputRow<'a> {
    fn from(r: &'a ContributionRecord) -> Self {
        let or_sentinel = |v: &'a Option<String>| v.as_deref().unwrap_or(NOT_FOUND);
        Self {
            date: &r.date,
            contributor_name: &r.contributor_name,
            address: or_sentinel(&r.address),
            city: or_sentinel(&r.city),
            state: or_sentinel(&r.state),
            zip: or_sentinel(&r.zip),
            occupation: or_sentinel(&r.occupation),
            employer: or_sentinel(&r.employer),
            amount: &r.amount,
        }
    }
}

impl OutputRow<'_> {
    fn as_array(&self) -> [&str; 9] {
        [
            self.date,
            self.contributor_name,
            self.address,
            self.city,
            self.state,
            self.zip,
            self.occupation,
            self.employer,
            self.amount,
        ]
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Saves the records as CSV, one row per record in the given order
    pub fn save_records_csv(&self, stem: &str, records: &[ContributionRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_contributions.csv", stem));

        let mut writer = csv::Writer::from_path(&file_path)?;
        writer.write_record(CSV_HEADERS)?;
        for record in records {
            writer.write_record(OutputRow::from(record).as_array())?;
        }
        writer.flush()?;

        tracing::info!("Saved {} record(s) to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves the records as a JSON array
    pub fn save_records_json(&self, stem: &str, records: &[ContributionRecord]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_contributions.json", stem));

        let rows: Vec<OutputRow> = records.iter().map(OutputRow::from).collect();
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json)?;

        tracing::info!("Saved {} record(s) to {}", records.len(), file_path.display());
        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_run_metadata(&self, stem: &str, input: &str, report: &ExtractionReport) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(format!("{}_meta.json", stem));

        let metadata = serde_json::json!({
            "input": input,
            "outcome": report.outcome.label(),
            "stats": report.stats,
            "record_count": report.outcome.records().len(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::pipeline::{ExtractionOutcome, ExtractionStats};

    // The manager creates its own output dir below the temp dir.
    fn temp_storage() -> (tempfile::TempDir, StorageManager) {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("output")).unwrap();
        (dir, storage)
    }

    fn records() -> Vec<ContributionRecord> {
        vec![
            ContributionRecord {
                date: "01/15/2023".to_string(),
                contributor_name: "Jane Doe".to_string(),
                address: Some("Austin, TX 78701".to_string()),
                city: Some("Austin".to_string()),
                state: Some("TX".to_string()),
                zip: Some("78701".to_string()),
                occupation: Some("Engineer".to_string()),
                employer: Some("Acme Corp".to_string()),
                amount: "$500.00".to_string(),
            },
            ContributionRecord {
                date: "01/16/2023".to_string(),
                contributor_name: "Doe, John".to_string(),
                address: None,
                city: None,
                state: None,
                zip: None,
                occupation: Some("Retired".to_string()),
                employer: None,
                amount: "$1,000.00".to_string(),
            },
        ]
    }

    #[test]
    fn test_csv_output() {
        let (dir, storage) = temp_storage();
        let path = storage.save_records_csv("report", &records()).unwrap();
        assert_eq!(path, dir.path().join("output").join("report_contributions.csv"));
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Date,Contributor Name,Address,City,State,Zip,Occupation,Employer,Amount");
        assert_eq!(
            lines[1],
            "01/15/2023,Jane Doe,\"Austin, TX 78701\",Austin,TX,78701,Engineer,Acme Corp,$500.00"
        );
        assert_eq!(
            lines[2],
            "01/16/2023,\"Doe, John\",No Data,No Data,No Data,No Data,Retired,No Data,\"$1,000.00\""
        );
    }

    #[test]
    fn test_json_output_uses_sentinel() {
        let (_dir, storage) = temp_storage();
        let path = storage.save_records_json("report", &records()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["city"], "Austin");
        assert_eq!(value[1]["employer"], NOT_FOUND);
        assert_eq!(value[1]["amount"], "$1,000.00");
    }

    #[test]
    fn test_metadata_output() {
        let (_dir, storage) = temp_storage();
        let report = ExtractionReport {
            outcome: ExtractionOutcome::NoRelevantPages,
            stats: ExtractionStats {
                pages_total: 3,
                pages_with_text: 3,
                ..ExtractionStats::default()
            },
        };
        let path = storage.save_run_metadata("report", "report.pdf", &report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcome"], "no_relevant_pages");
        assert_eq!(value["stats"]["pages_total"], 3);
        assert_eq!(value["record_count"], 0);
        assert!(value["extraction_timestamp"].is_string());
    }
}
