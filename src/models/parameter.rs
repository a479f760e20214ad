use crate::utils::constants::{
    DEPARTURE_QUALIFIER, DRY_BULB_TEMPERATURE, MONTHLY_MARKER, TEMPERATURE, WET_BULB_QUALIFIER,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical, provenance-free name of a physical quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterName(String);

impl ParameterName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Canonical name for a monthly field.
    ///
    /// Strips the `Monthly` marker; a bare `Temperature` means dry-bulb
    /// temperature unless the name is qualified as wet-bulb or a departure.
    pub fn from_monthly_field(field: &str) -> Self {
        let param = field.replace(MONTHLY_MARKER, "");
        if param.contains(WET_BULB_QUALIFIER) || param.contains(DEPARTURE_QUALIFIER) {
            Self(param)
        } else {
            Self(param.replace(TEMPERATURE, DRY_BULB_TEMPERATURE))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParameterName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered canonical names, one per monthly column of a station file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyVocabulary {
    names: Vec<ParameterName>,
}

impl MonthlyVocabulary {
    pub fn new(names: Vec<ParameterName>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[ParameterName] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Vocabulary file contents: the names comma-joined on a single line
    pub fn to_line(&self) -> String {
        self.names
            .iter()
            .map(ParameterName::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn parse_line(line: &str) -> Self {
        let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
        if line.is_empty() {
            return Self::default();
        }

        Self {
            names: line.split(',').map(ParameterName::new).collect(),
        }
    }
}
