pub mod consistency_scorer;
pub mod daily_aggregator;
pub mod pipeline;
pub mod reconciler;
pub mod vocabulary_extractor;

pub use consistency_scorer::{coefficient_of_determination, ConsistencyScorer};
pub use daily_aggregator::{DailyAggregator, MeanAccumulator};
pub use pipeline::{Pipeline, RunReport, Stage, StationInspection, StationOutcome, StationStatus};
pub use reconciler::{ColumnMatch, ColumnReconciler, MatchRule};
pub use vocabulary_extractor::{MonthlyExtract, VocabularyExtractor};
