use crate::config::{EmptyOverlapPolicy, EvaluateConfig};
use crate::error::{ProcessingError, Result};
use crate::models::{
    ConsistencyVerdict, DerivedMonthlyDataset, MonthlyRow, OfficialMonthlyDataset, ParameterName,
    StationId,
};
use crate::utils::constants::{DEFAULT_CONSISTENCY_THRESHOLD, MIN_ALIGNED_ROWS};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A column present in both datasets, with its position in each
#[derive(Debug, Clone, PartialEq)]
struct SharedColumn {
    name: ParameterName,
    official: usize,
    derived: usize,
}

/// Scores derived monthly values against the official monthly summary
pub struct ConsistencyScorer {
    threshold: f64,
    empty_overlap: EmptyOverlapPolicy,
}

impl ConsistencyScorer {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_CONSISTENCY_THRESHOLD,
            empty_overlap: EmptyOverlapPolicy::Consistent,
        }
    }

    pub fn from_config(config: &EvaluateConfig) -> Self {
        Self {
            threshold: config.threshold,
            empty_overlap: config.empty_overlap,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_empty_overlap(mut self, empty_overlap: EmptyOverlapPolicy) -> Self {
        self.empty_overlap = empty_overlap;
        self
    }

    /// Compare the two datasets column by column with the coefficient of determination.
    ///
    /// Columns missing everywhere are ignored. Official rows are aligned to the
    /// derived row of the same calendar month, keeping official row order
    /// within a month. Scores follow official column order.
    pub fn score(
        &self,
        station: &StationId,
        official: &OfficialMonthlyDataset,
        derived: &DerivedMonthlyDataset,
    ) -> Result<ConsistencyVerdict> {
        let official = official.without_empty_columns();
        let derived = derived.without_empty_columns();

        let shared = shared_columns(&official, &derived);
        if shared.is_empty() {
            debug!(station = %station, policy = ?self.empty_overlap, "No shared columns");
            return match self.empty_overlap {
                EmptyOverlapPolicy::Consistent => Ok(ConsistencyVerdict::from_scores(
                    Vec::new(),
                    Vec::new(),
                    0,
                    self.threshold,
                )),
                EmptyOverlapPolicy::Insufficient => Err(ProcessingError::InsufficientData {
                    station: station.clone(),
                    aligned_rows: 0,
                }),
            };
        }

        let official_indices: Vec<usize> = shared.iter().map(|c| c.official).collect();
        let derived_indices: Vec<usize> = shared.iter().map(|c| c.derived).collect();

        let mut derived_by_month: BTreeMap<u32, &MonthlyRow> = BTreeMap::new();
        for row in derived
            .rows
            .iter()
            .filter(|row| is_complete(row, &derived_indices))
        {
            derived_by_month.entry(row.month).or_insert(row);
        }

        let mut aligned: Vec<(&MonthlyRow, &MonthlyRow)> = official
            .rows
            .iter()
            .filter(|row| is_complete(row, &official_indices))
            .filter_map(|row| derived_by_month.get(&row.month).map(|&d| (row, d)))
            .collect();
        aligned.sort_by_key(|(row, _)| row.month);

        if aligned.len() < MIN_ALIGNED_ROWS {
            return Err(ProcessingError::InsufficientData {
                station: station.clone(),
                aligned_rows: aligned.len(),
            });
        }

        let mut scores = Vec::with_capacity(shared.len());
        for column in &shared {
            let (truth, predicted): (Vec<f64>, Vec<f64>) = aligned
                .iter()
                .filter_map(|(o, d)| Some((o.value(column.official)?, d.value(column.derived)?)))
                .unzip();

            let score = coefficient_of_determination(&truth, &predicted).ok_or_else(|| {
                ProcessingError::InsufficientData {
                    station: station.clone(),
                    aligned_rows: truth.len(),
                }
            })?;
            debug!(station = %station, column = %column.name, r2 = score, "Scored column");
            scores.push(score);
        }

        Ok(ConsistencyVerdict::from_scores(
            shared.into_iter().map(|c| c.name).collect(),
            scores,
            aligned.len(),
            self.threshold,
        ))
    }
}

impl Default for ConsistencyScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn shared_columns(
    official: &OfficialMonthlyDataset,
    derived: &DerivedMonthlyDataset,
) -> Vec<SharedColumn> {
    let mut seen = HashSet::new();

    official
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| seen.insert(*name))
        .filter_map(|(i, name)| {
            derived.column_index(name).map(|j| SharedColumn {
                name: name.clone(),
                official: i,
                derived: j,
            })
        })
        .collect()
}

fn is_complete(row: &MonthlyRow, indices: &[usize]) -> bool {
    indices.iter().all(|&i| row.value(i).is_some())
}

/// R² of `predicted` against the ground truth `truth`.
///
/// A constant ground truth scores 1.0 when matched exactly and 0.0
/// otherwise. None when the series differ in length or hold fewer than two
/// points.
pub fn coefficient_of_determination(truth: &[f64], predicted: &[f64]) -> Option<f64> {
    if truth.len() != predicted.len() || truth.len() < MIN_ALIGNED_ROWS {
        return None;
    }

    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    let ss_res: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        Some(if ss_res == 0.0 { 1.0 } else { 0.0 })
    } else {
        Some(1.0 - ss_res / ss_tot)
    }
}
