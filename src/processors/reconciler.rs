use crate::models::{FieldKind, MonthlyVocabulary, ParameterName};
use crate::utils::constants::{AVERAGE_QUALIFIER, DAILY_MARKER, MEAN_QUALIFIER};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Which rule tied a daily column to a canonical name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchRule {
    /// Daily parameter occurs verbatim inside the canonical name
    Substring,
    /// "Average" daily parameter against a "Mean"/"Average"/unqualified monthly name
    AveragingConvention,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Substring => f.write_str("substring"),
            MatchRule::AveragingConvention => f.write_str("averaging-convention"),
        }
    }
}

/// A daily column retained under a canonical name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    /// Index into the station record's fields
    pub field_index: usize,
    pub daily_field: String,
    pub canonical: ParameterName,
    pub rule: MatchRule,
}

/// Maps daily-observation columns onto a station's monthly vocabulary
pub struct ColumnReconciler;

impl ColumnReconciler {
    pub fn new() -> Self {
        Self
    }

    /// Match a bare daily parameter (marker removed) against one canonical name
    pub fn match_rule(daily_param: &str, canonical: &ParameterName) -> Option<MatchRule> {
        if daily_param.is_empty() {
            return None;
        }

        let canonical = canonical.as_str();
        if canonical.contains(daily_param) {
            return Some(MatchRule::Substring);
        }

        if daily_param.contains(AVERAGE_QUALIFIER) {
            let monthly_core = canonical
                .replace(MEAN_QUALIFIER, "")
                .replace(AVERAGE_QUALIFIER, "");
            let daily_core = daily_param.replace(AVERAGE_QUALIFIER, "");
            // An empty core would match every averaged column
            if !monthly_core.is_empty() && daily_core.contains(monthly_core.as_str()) {
                return Some(MatchRule::AveragingConvention);
            }
        }

        None
    }

    /// First vocabulary entry, in vocabulary order, that the daily parameter matches
    pub fn find_match<'a>(
        daily_param: &str,
        vocabulary: &'a MonthlyVocabulary,
    ) -> Option<(&'a ParameterName, MatchRule)> {
        vocabulary
            .iter()
            .find_map(|name| Self::match_rule(daily_param, name).map(|rule| (name, rule)))
    }

    /// Reconcile a station's fields against its vocabulary.
    ///
    /// Only fields carrying the daily marker are considered. Unmatched daily
    /// fields are dropped. When several daily fields reach the same canonical
    /// name, the first in header order is kept.
    pub fn reconcile(&self, fields: &[String], vocabulary: &MonthlyVocabulary) -> Vec<ColumnMatch> {
        let mut matches = Vec::new();
        let mut claimed: HashSet<&ParameterName> = HashSet::new();

        for (field_index, field) in fields.iter().enumerate() {
            if FieldKind::classify(field) != FieldKind::Daily {
                continue;
            }

            let daily_param = field.replace(DAILY_MARKER, "");
            let Some((canonical, rule)) = Self::find_match(&daily_param, vocabulary) else {
                debug!(daily_field = %field, "No monthly counterpart, dropping daily column");
                continue;
            };

            if !claimed.insert(canonical) {
                warn!(
                    daily_field = %field,
                    canonical = %canonical,
                    "Canonical name already matched by an earlier daily column, keeping the first"
                );
                continue;
            }

            debug!(daily_field = %field, canonical = %canonical, rule = %rule, "Matched daily column");
            matches.push(ColumnMatch {
                field_index,
                daily_field: field.clone(),
                canonical: canonical.clone(),
                rule,
            });
        }

        matches
    }
}

impl Default for ColumnReconciler {
    fn default() -> Self {
        Self::new()
    }
}
