use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{Classification, MonthlyVocabulary, StationId};
use crate::processors::reconciler::ColumnMatch;
use crate::processors::{ConsistencyScorer, DailyAggregator, VocabularyExtractor};
use crate::readers::{ArtifactReader, StationReader};
use crate::utils::constants::RUN_REPORT_FILE;
use crate::utils::filename::{discover_stations, StationPaths};
use crate::utils::progress::ProgressReporter;
use crate::writers::ArtifactWriter;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Prepare,
    Process,
    Evaluate,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Prepare, Stage::Process, Stage::Evaluate];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Prepare => f.write_str("prepare"),
            Stage::Process => f.write_str("process"),
            Stage::Evaluate => f.write_str("evaluate"),
        }
    }
}

/// What one stage produced for one station
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StationStatus {
    Prepared {
        monthly_columns: usize,
        official_rows: usize,
        rejected_rows: usize,
    },
    Processed {
        retained_columns: usize,
        months: usize,
        rejected_rows: usize,
    },
    Evaluated {
        classification: Classification,
        scores: Vec<f64>,
        aligned_rows: usize,
    },
    Failed {
        kind: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationOutcome {
    pub station: StationId,
    pub stage: Stage,
    #[serde(flatten)]
    pub status: StationStatus,
}

impl StationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.status, StationStatus::Failed { .. })
    }
}

/// Per-station outcomes of a pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<StationOutcome>,
}

impl RunReport {
    pub fn extend(&mut self, outcomes: Vec<StationOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub fn failures(&self) -> impl Iterator<Item = &StationOutcome> {
        self.outcomes.iter().filter(|o| o.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn count_classification(&self, classification: Classification) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(&o.status, StationStatus::Evaluated { classification: c, .. } if *c == classification)
            })
            .count()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Consistency Run Report ===\n");
        for stage in Stage::ALL {
            let outcomes: Vec<&StationOutcome> =
                self.outcomes.iter().filter(|o| o.stage == stage).collect();
            if outcomes.is_empty() {
                continue;
            }
            let failed = outcomes.iter().filter(|o| o.is_failure()).count();
            summary.push_str(&format!(
                "{:<9} {} stations, {} succeeded, {} failed\n",
                stage.to_string() + ":",
                outcomes.len(),
                outcomes.len() - failed,
                failed
            ));
        }

        summary.push_str(&format!(
            "Verdicts: {} consistent, {} inconsistent\n",
            self.count_classification(Classification::Consistent),
            self.count_classification(Classification::Inconsistent)
        ));

        let failures: Vec<&StationOutcome> = self.failures().collect();
        if !failures.is_empty() {
            summary.push_str("\nFailures:\n");
            for outcome in failures.iter().take(10) {
                if let StationStatus::Failed { message, .. } = &outcome.status {
                    summary.push_str(&format!(
                        "  [{}] {}: {}\n",
                        outcome.stage, outcome.station, message
                    ));
                }
            }
            if failures.len() > 10 {
                summary.push_str(&format!("  ... and {} more\n", failures.len() - 10));
            }
        }

        summary
    }
}

/// Reconciliation view of a single station file, without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct StationInspection {
    pub station: StationId,
    pub rows: usize,
    pub rejected_rows: usize,
    pub vocabulary: MonthlyVocabulary,
    pub official_rows: usize,
    pub matches: Vec<ColumnMatch>,
    pub derived_months: usize,
}

/// Drives the three stages over every station file, one rayon task per station.
///
/// A failure is confined to its station and stage: it is logged, recorded in
/// the outcome, and the remaining stations carry on.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn discover_stations(&self) -> Result<Vec<StationId>> {
        discover_stations(&self.config.paths.input_dir)
    }

    pub fn station_paths(&self, station: &StationId) -> StationPaths {
        StationPaths::new(station, &self.config.paths)
    }

    /// Run the given stages in order, each over all stations
    pub fn run(
        &self,
        stages: &[Stage],
        stations: &[StationId],
        silent: bool,
    ) -> Result<RunReport> {
        let mut report = RunReport::default();

        for &stage in stages {
            let progress = ProgressReporter::for_stage(stage, stations.len() as u64, silent);
            let outcomes = self.run_stage(stage, stations, Some(&progress))?;
            progress.finish_with_message(&format!("{}: {} stations", stage, stations.len()));
            report.extend(outcomes);
        }

        Ok(report)
    }

    pub fn run_stage(
        &self,
        stage: Stage,
        stations: &[StationId],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<StationOutcome>> {
        let processed_count = AtomicUsize::new(0);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.processing.max_workers)
            .build()
            .map_err(|e| ProcessingError::ThreadPool(e.to_string()))?;

        let outcomes: Vec<StationOutcome> = pool.install(|| {
            stations
                .par_iter()
                .map(|station| {
                    let outcome = self.run_station(stage, station);

                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    outcome
                })
                .collect()
        });

        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        info!(
            stage = %stage,
            stations = outcomes.len(),
            failed,
            "Stage complete"
        );

        Ok(outcomes)
    }

    fn run_station(&self, stage: Stage, station: &StationId) -> StationOutcome {
        let result = match stage {
            Stage::Prepare => self.prepare_station(station),
            Stage::Process => self.process_station(station),
            Stage::Evaluate => self.evaluate_station(station),
        };

        let status = result.unwrap_or_else(|e| {
            warn!(stage = %stage, station = %station, error = %e, "Station failed");
            self.remove_stale_artifacts(stage, station);
            StationStatus::Failed {
                kind: e.kind().to_string(),
                message: e.to_string(),
            }
        });

        StationOutcome {
            station: station.clone(),
            stage,
            status,
        }
    }

    /// Extract the vocabulary and official monthly dataset of one station
    pub fn prepare_station(&self, station: &StationId) -> Result<StationStatus> {
        let paths = self.station_paths(station);
        let record = StationReader::from_config(&self.config.reader)
            .read_station_with_id(&paths.raw, station.clone())?;

        let extract = VocabularyExtractor::new().extract(&record);
        ArtifactWriter::write_vocabulary(&extract.vocabulary, &paths.vocabulary)?;
        ArtifactWriter::write_monthly_dataset(&extract.official, &paths.official)?;

        debug!(station = %station, vocabulary = %extract.vocabulary.to_line(), "Prepared station");
        Ok(StationStatus::Prepared {
            monthly_columns: extract.vocabulary.len(),
            official_rows: extract.official.row_count(),
            rejected_rows: record.rejected_rows,
        })
    }

    /// Aggregate daily columns of one station against its stored vocabulary
    pub fn process_station(&self, station: &StationId) -> Result<StationStatus> {
        let paths = self.station_paths(station);
        let vocabulary = ArtifactReader::read_vocabulary(&paths.vocabulary, station)?;
        let record = StationReader::from_config(&self.config.reader)
            .read_station_with_id(&paths.raw, station.clone())?;

        let derived = DailyAggregator::new().aggregate(&record, &vocabulary);
        ArtifactWriter::write_monthly_dataset(&derived, &paths.derived)?;

        Ok(StationStatus::Processed {
            retained_columns: derived.columns.len(),
            months: derived.row_count(),
            rejected_rows: record.rejected_rows,
        })
    }

    /// Score one station and write its verdict file
    pub fn evaluate_station(&self, station: &StationId) -> Result<StationStatus> {
        let paths = self.station_paths(station);
        let official =
            ArtifactReader::read_monthly_dataset(&paths.official, station, "official monthly dataset")?;
        let derived =
            ArtifactReader::read_monthly_dataset(&paths.derived, station, "derived monthly dataset")?;

        let verdict = ConsistencyScorer::from_config(&self.config.evaluate)
            .score(station, &official, &derived)?;
        ArtifactWriter::write_verdict(&verdict, &paths.verdict)?;

        debug!(
            station = %station,
            classification = %verdict.classification,
            scores = %verdict.score_line(),
            "Evaluated station"
        );
        Ok(StationStatus::Evaluated {
            classification: verdict.classification,
            scores: verdict.scores,
            aligned_rows: verdict.aligned_rows,
        })
    }

    /// Delete earlier-run outputs of a stage that just failed for this station
    fn remove_stale_artifacts(&self, stage: Stage, station: &StationId) {
        let paths = self.station_paths(station);
        let stale = match stage {
            Stage::Prepare => vec![paths.vocabulary, paths.official],
            Stage::Process => vec![paths.derived],
            Stage::Evaluate => vec![paths.verdict],
        };

        for path in stale {
            match fs::remove_file(&path) {
                Ok(()) => debug!(stage = %stage, path = %path.display(), "Removed stale artifact"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Could not remove stale artifact"),
            }
        }
    }

    /// Reconcile one raw station file in memory and report what each stage would produce
    pub fn inspect(&self, path: &Path) -> Result<StationInspection> {
        let record = StationReader::from_config(&self.config.reader).read_station(path)?;
        let extract = VocabularyExtractor::new().extract(&record);

        let aggregator = DailyAggregator::new();
        let matches = aggregator.reconcile(&record, &extract.vocabulary);
        let derived = aggregator.aggregate_matches(&record, &matches);

        Ok(StationInspection {
            station: record.station.clone(),
            rows: record.row_count(),
            rejected_rows: record.rejected_rows,
            official_rows: extract.official.row_count(),
            vocabulary: extract.vocabulary,
            matches,
            derived_months: derived.row_count(),
        })
    }

    pub fn write_report(&self, report: &RunReport) -> Result<PathBuf> {
        let path = self.config.paths.verdict_dir.join(RUN_REPORT_FILE);
        ArtifactWriter::write_json(report, &path)?;
        Ok(path)
    }
}
