pub mod dataset;
pub mod parameter;
pub mod station;
pub mod verdict;

pub use dataset::{DerivedMonthlyDataset, MonthlyDataset, MonthlyRow, OfficialMonthlyDataset};
pub use parameter::{MonthlyVocabulary, ParameterName};
pub use station::{FieldKind, Observation, StationId, StationRecord};
pub use verdict::{Classification, ConsistencyVerdict};
