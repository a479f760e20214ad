use crate::error::{ProcessingError, Result};
use crate::models::{MonthlyDataset, MonthlyRow, MonthlyVocabulary, ParameterName, StationId};
use crate::readers::station_reader::parse_value;
use crate::utils::constants::MONTH_COLUMN;
use csv::{ReaderBuilder, Trim};
use std::fs;
use std::path::Path;

/// Reads the intermediate artifacts written by earlier stages
pub struct ArtifactReader;

impl ArtifactReader {
    pub fn read_vocabulary(path: &Path, station: &StationId) -> Result<MonthlyVocabulary> {
        ensure_exists(path, station, "vocabulary file")?;

        let content = fs::read_to_string(path)?;
        let first_line = content.lines().next().unwrap_or("");
        Ok(MonthlyVocabulary::parse_line(first_line))
    }

    /// Read a month-keyed dataset written by [`crate::writers::ArtifactWriter::write_monthly_dataset`]
    pub fn read_monthly_dataset(
        path: &Path,
        station: &StationId,
        artifact: &str,
    ) -> Result<MonthlyDataset> {
        ensure_exists(path, station, artifact)?;

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        if headers.get(0) != Some(MONTH_COLUMN) {
            return Err(ProcessingError::InvalidFormat(format!(
                "{} does not start with a '{}' column",
                path.display(),
                MONTH_COLUMN
            )));
        }

        let columns: Vec<ParameterName> = headers.iter().skip(1).map(ParameterName::new).collect();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            let month_cell = record.get(0).unwrap_or("");
            let month = month_cell.parse::<u32>().map_err(|_| {
                ProcessingError::InvalidFormat(format!(
                    "Invalid month '{}' in {}",
                    month_cell,
                    path.display()
                ))
            })?;

            let values = (1..=columns.len())
                .map(|i| record.get(i).and_then(parse_value))
                .collect();
            rows.push(MonthlyRow::new(month, values));
        }

        Ok(MonthlyDataset::with_rows(columns, rows))
    }
}

fn ensure_exists(path: &Path, station: &StationId, artifact: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ProcessingError::MissingCorrespondence {
            station: station.clone(),
            artifact: artifact.to_string(),
        })
    }
}
