use crate::models::ParameterName;
use serde::{Deserialize, Serialize};

/// One month-keyed row; `values` is aligned with the dataset's columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRow {
    pub month: u32,
    pub values: Vec<Option<f64>>,
}

impl MonthlyRow {
    pub fn new(month: u32, values: Vec<Option<f64>>) -> Self {
        Self { month, values }
    }

    pub fn value(&self, column: usize) -> Option<f64> {
        self.values.get(column).copied().flatten()
    }
}

/// Month-keyed table with canonical column names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyDataset {
    pub columns: Vec<ParameterName>,
    pub rows: Vec<MonthlyRow>,
}

/// Official monthly summary rows; one row per source row, not deduplicated by year
pub type OfficialMonthlyDataset = MonthlyDataset;

/// Daily values averaged per calendar month; one row per distinct month
pub type DerivedMonthlyDataset = MonthlyDataset;

impl MonthlyDataset {
    pub fn new(columns: Vec<ParameterName>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<ParameterName>, rows: Vec<MonthlyRow>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, month: u32, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.push(MonthlyRow::new(month, values));
    }

    /// First column carrying the given name
    pub fn column_index(&self, name: &ParameterName) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Copy of the dataset without columns that are missing in every row
    pub fn without_empty_columns(&self) -> MonthlyDataset {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.rows.iter().any(|row| row.value(i).is_some()))
            .collect();

        let columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| MonthlyRow::new(row.month, keep.iter().map(|&i| row.value(i)).collect()))
            .collect();

        MonthlyDataset { columns, rows }
    }
}
