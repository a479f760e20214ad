use crate::config::ReaderConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Observation, StationId, StationRecord};
use crate::utils::constants::{DATE_FORMATS, DEFAULT_BUFFER_SIZE, DEFAULT_DATE_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Reads raw station CSV files into [`StationRecord`]s.
///
/// Rows whose date is missing or unparseable are dropped and counted; the
/// file only fails when it had data rows and none of them survived.
pub struct StationReader {
    date_column: String,
    use_mmap: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            use_mmap: false,
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            date_column: config.date_column.clone(),
            use_mmap: config.use_mmap,
        }
    }

    pub fn with_date_column(mut self, date_column: &str) -> Self {
        self.date_column = date_column.to_string();
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read a station file, deriving the station id from its file name
    pub fn read_station(&self, path: &Path) -> Result<StationRecord> {
        let station = StationId::from_path(path)?;
        self.read_station_with_id(path, station)
    }

    pub fn read_station_with_id(&self, path: &Path, station: StationId) -> Result<StationRecord> {
        let file = File::open(path)?;

        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from(&mmap[..], station)
        } else {
            let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            self.read_from(reader, station)
        }
    }

    fn read_from<R: Read>(&self, reader: R, station: StationId) -> Result<StationRecord> {
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_index = headers
            .iter()
            .position(|h| h == self.date_column)
            .ok_or_else(|| ProcessingError::MalformedInput {
                station: station.clone(),
                message: format!("date column '{}' not found in header", self.date_column),
            })?;

        let positions: Vec<usize> = (0..headers.len()).filter(|&i| i != date_index).collect();
        let fields: Vec<String> = positions.iter().map(|&i| headers[i].to_string()).collect();

        let mut observations = Vec::new();
        let mut total_rows = 0;
        let mut rejected_rows = 0;

        for (row_number, result) in csv_reader.records().enumerate() {
            total_rows += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    rejected_rows += 1;
                    debug!(station = %station, row = row_number + 1, error = %e, "Rejected unreadable row");
                    continue;
                }
            };

            match self.parse_row(&record, date_index, &positions) {
                Some(observation) => observations.push(observation),
                None => {
                    rejected_rows += 1;
                    debug!(station = %station, row = row_number + 1, "Rejected row without a valid date");
                }
            }
        }

        if total_rows > 0 && observations.is_empty() {
            return Err(ProcessingError::MalformedInput {
                station,
                message: format!("all {} data rows were rejected", total_rows),
            });
        }

        if rejected_rows > 0 {
            warn!(
                station = %station,
                rejected_rows,
                total_rows,
                "Dropped rows with missing or unparseable dates"
            );
        }

        let mut record = StationRecord::new(station, fields, observations);
        record.rejected_rows = rejected_rows;
        Ok(record)
    }

    fn parse_row(
        &self,
        record: &StringRecord,
        date_index: usize,
        positions: &[usize],
    ) -> Option<Observation> {
        let date = record.get(date_index).and_then(parse_observation_date)?;
        let values = positions
            .iter()
            .map(|&i| record.get(i).and_then(parse_value))
            .collect();

        Some(Observation::new(date, values))
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a date or timestamp cell, keeping only the calendar date
pub fn parse_observation_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(s, format)
            .map(|dt| dt.date())
            .or_else(|_| NaiveDate::parse_from_str(s, format))
            .ok()
    })
}

/// Parse a numeric cell; empty or non-numeric cells are missing
pub fn parse_value(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_station_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_parse_observation_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 3, 14).unwrap();
        assert_eq!(parse_observation_date("2023-03-14T23:59:00"), Some(expected));
        assert_eq!(parse_observation_date("2023-03-14T07:51"), Some(expected));
        assert_eq!(parse_observation_date("2023-03-14 00:00:00"), Some(expected));
        assert_eq!(parse_observation_date("2023-03-14"), Some(expected));
        assert_eq!(parse_observation_date("20230314"), Some(expected));
        assert_eq!(parse_observation_date("14/03/2023"), None);
        assert_eq!(parse_observation_date(""), None);
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("12.5"), Some(12.5));
        assert_eq!(parse_value(" -3 "), Some(-3.0));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("T"), None);
        assert_eq!(parse_value("NaN"), None);
    }

    #[test]
    fn test_read_station_file() -> Result<()> {
        let file = write_station_file(&[
            "STATION,DATE,DailyAverageDryBulbTemperature,MonthlyMeanTemperature,REPORT_TYPE",
            "72219013874,2023-03-01T23:59:00,10,,SOD",
            "72219013874,2023-03-02T23:59:00,20,,SOD",
            "72219013874,2023-03-31T23:59:00,,15.5,SOM",
        ]);

        let reader = StationReader::new();
        let record = reader.read_station_with_id(file.path(), StationId::new("72219013874"))?;

        assert_eq!(
            record.fields,
            vec![
                "STATION",
                "DailyAverageDryBulbTemperature",
                "MonthlyMeanTemperature",
                "REPORT_TYPE"
            ]
        );
        assert_eq!(record.row_count(), 3);
        assert_eq!(record.rejected_rows, 0);
        assert_eq!(record.observations[0].month, 3);
        assert_eq!(record.observations[0].values[1], Some(10.0));
        assert_eq!(record.observations[2].values[1], None);
        assert_eq!(record.observations[2].values[2], Some(15.5));
        // Text cells are carried as missing
        assert_eq!(record.observations[0].values[3], None);
        Ok(())
    }

    #[test]
    fn test_bad_dates_are_dropped_not_fatal() -> Result<()> {
        let file = write_station_file(&[
            "DATE,DailyPrecipitation",
            "2023-01-01,0.1",
            "not-a-date,0.2",
            ",0.3",
            "2023-01-04,0.4",
        ]);

        let record = StationReader::new()
            .read_station_with_id(file.path(), StationId::new("s1"))?;
        assert_eq!(record.row_count(), 2);
        assert_eq!(record.rejected_rows, 2);
        Ok(())
    }

    #[test]
    fn test_all_rows_rejected_is_malformed() {
        let file = write_station_file(&["DATE,DailyPrecipitation", "garbage,1.0", "also bad,2.0"]);

        let result = StationReader::new().read_station_with_id(file.path(), StationId::new("s1"));
        assert!(matches!(result, Err(ProcessingError::MalformedInput { .. })));
    }

    #[test]
    fn test_missing_date_column_is_malformed() {
        let file = write_station_file(&["STATION,DailyPrecipitation", "1,1.0"]);

        let result = StationReader::new().read_station_with_id(file.path(), StationId::new("s1"));
        assert!(matches!(result, Err(ProcessingError::MalformedInput { .. })));
    }

    #[test]
    fn test_header_only_file_is_empty_record() -> Result<()> {
        let file = write_station_file(&["DATE,MonthlyMeanTemperature"]);

        let record = StationReader::new()
            .read_station_with_id(file.path(), StationId::new("s1"))?;
        assert_eq!(record.row_count(), 0);
        Ok(())
    }

    #[test]
    fn test_mmap_and_buffered_agree() -> Result<()> {
        let file = write_station_file(&[
            "DATE,DailyPrecipitation,ObsDate",
            "2023-05-01,1.5,x",
            "2023-05-02,,y",
        ]);

        let buffered = StationReader::new()
            .with_date_column("DATE")
            .read_station_with_id(file.path(), StationId::new("s1"))?;
        let mapped = StationReader::new()
            .with_mmap(true)
            .read_station_with_id(file.path(), StationId::new("s1"))?;

        assert_eq!(buffered.fields, mapped.fields);
        assert_eq!(buffered.observations, mapped.observations);
        Ok(())
    }
}
