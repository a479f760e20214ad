use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DAILY_MARKER, MONTHLY_MARKER};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Join key correlating every per-stage artifact of one station file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the station id from a raw station file path (e.g. 72219013874.csv -> 72219013874)
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Cannot derive station id from path: {}",
                    path.display()
                ))
            })?;

        Ok(Self(stem.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provenance of a field, from the marker embedded in its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Monthly,
    Daily,
    Other,
}

impl FieldKind {
    pub fn classify(field: &str) -> Self {
        if field.contains(MONTHLY_MARKER) {
            FieldKind::Monthly
        } else if field.contains(DAILY_MARKER) {
            FieldKind::Daily
        } else {
            FieldKind::Other
        }
    }
}

/// One dated row of a station file
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub month: u32,
    pub values: Vec<Option<f64>>,
}

impl Observation {
    pub fn new(date: NaiveDate, values: Vec<Option<f64>>) -> Self {
        Self {
            date,
            month: date.month(),
            values,
        }
    }

    /// True if any of the given field indices holds a value
    pub fn has_any(&self, indices: &[usize]) -> bool {
        indices
            .iter()
            .any(|&i| self.values.get(i).copied().flatten().is_some())
    }
}

/// A raw station file: field names (date column excluded) and its usable rows
#[derive(Debug, Clone)]
pub struct StationRecord {
    pub station: StationId,
    pub fields: Vec<String>,
    pub observations: Vec<Observation>,
    pub rejected_rows: usize,
}

impl StationRecord {
    pub fn new(station: StationId, fields: Vec<String>, observations: Vec<Observation>) -> Self {
        Self {
            station,
            fields,
            observations,
            rejected_rows: 0,
        }
    }

    /// Indices of fields of the given kind, in header order
    pub fn field_indices(&self, kind: FieldKind) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, name)| FieldKind::classify(name) == kind)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.observations.len()
    }
}
