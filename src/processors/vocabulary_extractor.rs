use crate::models::{
    FieldKind, MonthlyVocabulary, OfficialMonthlyDataset, ParameterName, StationRecord,
};
use tracing::debug;

/// Canonical vocabulary and official monthly rows of one station file
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyExtract {
    pub vocabulary: MonthlyVocabulary,
    pub official: OfficialMonthlyDataset,
}

pub struct VocabularyExtractor;

impl VocabularyExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Derive the monthly vocabulary and the official monthly dataset.
    ///
    /// Columns keep header order. Only rows carrying at least one monthly
    /// value are kept; rows from different years stay separate.
    pub fn extract(&self, record: &StationRecord) -> MonthlyExtract {
        let monthly_indices = record.field_indices(FieldKind::Monthly);

        let vocabulary = MonthlyVocabulary::new(
            monthly_indices
                .iter()
                .map(|&i| ParameterName::from_monthly_field(&record.fields[i]))
                .collect(),
        );

        let mut official = OfficialMonthlyDataset::new(vocabulary.names().to_vec());
        for observation in &record.observations {
            if !observation.has_any(&monthly_indices) {
                continue;
            }

            let values = monthly_indices
                .iter()
                .map(|&i| observation.values.get(i).copied().flatten())
                .collect();
            official.push_row(observation.month, values);
        }

        debug!(
            station = %record.station,
            monthly_columns = vocabulary.len(),
            official_rows = official.row_count(),
            "Extracted monthly vocabulary"
        );

        MonthlyExtract {
            vocabulary,
            official,
        }
    }
}

impl Default for VocabularyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonthlyRow, Observation, StationId};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn station_record() -> StationRecord {
        let fields = vec![
            "STATION".to_string(),
            "DailyAverageDryBulbTemperature".to_string(),
            "MonthlyMeanTemperature".to_string(),
            "MonthlyWetBulbTemperature".to_string(),
            "MonthlyDepartureFromNormalTemperature".to_string(),
        ];
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        StationRecord::new(
            StationId::new("72219013874"),
            fields,
            vec![
                Observation::new(day(2022, 1, 1), vec![None, Some(40.0), None, None, None]),
                Observation::new(day(2022, 1, 31), vec![None, None, Some(41.5), Some(38.0), Some(-1.2)]),
                Observation::new(day(2022, 2, 28), vec![None, None, Some(44.0), None, None]),
                Observation::new(day(2023, 1, 31), vec![None, None, Some(43.0), Some(39.0), Some(0.3)]),
            ],
        )
    }

    #[test]
    fn test_vocabulary_follows_column_order() {
        let extract = VocabularyExtractor::new().extract(&station_record());

        assert_eq!(
            extract.vocabulary.to_line(),
            "MeanDryBulbTemperature,WetBulbTemperature,DepartureFromNormalTemperature"
        );
        assert_eq!(extract.official.columns, extract.vocabulary.names().to_vec());
    }

    #[test]
    fn test_official_rows_keep_years_separate() {
        let extract = VocabularyExtractor::new().extract(&station_record());

        assert_eq!(
            extract.official.rows,
            vec![
                MonthlyRow::new(1, vec![Some(41.5), Some(38.0), Some(-1.2)]),
                MonthlyRow::new(2, vec![Some(44.0), None, None]),
                MonthlyRow::new(1, vec![Some(43.0), Some(39.0), Some(0.3)]),
            ]
        );
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let record = station_record();
        let extractor = VocabularyExtractor::new();
        assert_eq!(extractor.extract(&record), extractor.extract(&record));
    }

    #[test]
    fn test_no_monthly_columns_is_empty_not_error() {
        let record = StationRecord::new(
            StationId::new("s1"),
            vec!["DailyPrecipitation".to_string()],
            vec![Observation::new(
                NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                vec![Some(0.1)],
            )],
        );

        let extract = VocabularyExtractor::new().extract(&record);
        assert!(extract.vocabulary.is_empty());
        assert!(extract.official.is_empty());
        assert!(extract.official.columns.is_empty());
    }
}
