use crate::models::ParameterName;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Consistent,
    Inconsistent,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Consistent => "Consistent",
            Classification::Inconsistent => "Inconsistent",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing derived monthly values against the official summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyVerdict {
    pub classification: Classification,
    /// Shared columns, in the order the scores are listed
    pub columns: Vec<ParameterName>,
    pub scores: Vec<f64>,
    pub aligned_rows: usize,
}

impl ConsistencyVerdict {
    /// Classify scores against a threshold; no scores at all is vacuously consistent
    pub fn from_scores(
        columns: Vec<ParameterName>,
        scores: Vec<f64>,
        aligned_rows: usize,
        threshold: f64,
    ) -> Self {
        let classification = if scores.iter().all(|&s| s >= threshold) {
            Classification::Consistent
        } else {
            Classification::Inconsistent
        };

        Self {
            classification,
            columns,
            scores,
            aligned_rows,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.classification == Classification::Consistent
    }

    /// Scores comma-joined, shortest round-trip representation
    pub fn score_line(&self) -> String {
        self.scores
            .iter()
            .map(|s| format!("{:?}", s))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_threshold_is_inclusive() {
        let verdict = ConsistencyVerdict::from_scores(
            vec![ParameterName::new("A"), ParameterName::new("B")],
            vec![0.9, 1.0],
            12,
            0.9,
        );
        assert!(verdict.is_consistent());

        let verdict = ConsistencyVerdict::from_scores(
            vec![ParameterName::new("A"), ParameterName::new("B")],
            vec![0.95, 0.8999],
            12,
            0.9,
        );
        assert_eq!(verdict.classification, Classification::Inconsistent);
    }

    #[test]
    fn test_empty_scores_are_consistent() {
        let verdict = ConsistencyVerdict::from_scores(Vec::new(), Vec::new(), 0, 0.9);
        assert!(verdict.is_consistent());
        assert_eq!(verdict.score_line(), "");
    }

    #[test]
    fn test_score_line_format() {
        let verdict = ConsistencyVerdict::from_scores(
            vec![ParameterName::new("A"), ParameterName::new("B")],
            vec![1.0, 0.25],
            3,
            0.9,
        );
        assert_eq!(verdict.score_line(), "1.0,0.25");
    }
}
