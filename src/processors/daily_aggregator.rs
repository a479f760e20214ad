use crate::models::{DerivedMonthlyDataset, MonthlyVocabulary, StationRecord};
use crate::processors::reconciler::{ColumnMatch, ColumnReconciler};
use std::collections::BTreeMap;
use tracing::debug;

/// Running mean over the non-missing values of one column
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    /// None when no value was observed
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregates reconciled daily columns into per-month means
pub struct DailyAggregator {
    reconciler: ColumnReconciler,
}

impl DailyAggregator {
    pub fn new() -> Self {
        Self {
            reconciler: ColumnReconciler::new(),
        }
    }

    pub fn reconcile(&self, record: &StationRecord, vocabulary: &MonthlyVocabulary) -> Vec<ColumnMatch> {
        self.reconciler.reconcile(&record.fields, vocabulary)
    }

    /// Derive monthly values from the daily columns of a station file.
    ///
    /// Rows without any retained daily value are skipped. Months come out in
    /// ascending order, one row each, with columns named by their canonical
    /// parameter.
    pub fn aggregate(
        &self,
        record: &StationRecord,
        vocabulary: &MonthlyVocabulary,
    ) -> DerivedMonthlyDataset {
        let matches = self.reconcile(record, vocabulary);
        self.aggregate_matches(record, &matches)
    }

    pub fn aggregate_matches(
        &self,
        record: &StationRecord,
        matches: &[ColumnMatch],
    ) -> DerivedMonthlyDataset {
        let columns = matches.iter().map(|m| m.canonical.clone()).collect();
        let mut derived = DerivedMonthlyDataset::new(columns);
        if matches.is_empty() {
            return derived;
        }

        let indices: Vec<usize> = matches.iter().map(|m| m.field_index).collect();
        let mut groups: BTreeMap<u32, Vec<MeanAccumulator>> = BTreeMap::new();

        for observation in &record.observations {
            if !observation.has_any(&indices) {
                continue;
            }

            let accumulators = groups
                .entry(observation.month)
                .or_insert_with(|| vec![MeanAccumulator::default(); indices.len()]);
            for (accumulator, &i) in accumulators.iter_mut().zip(&indices) {
                accumulator.push(observation.values.get(i).copied().flatten());
            }
        }

        for (month, accumulators) in groups {
            derived.push_row(month, accumulators.iter().map(MeanAccumulator::mean).collect());
        }

        debug!(
            station = %record.station,
            retained_columns = matches.len(),
            months = derived.row_count(),
            "Aggregated daily columns"
        );

        derived
    }
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self::new()
    }
}
