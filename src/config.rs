use crate::error::Result;
use crate::utils::constants::{DEFAULT_CONSISTENCY_THRESHOLD, DEFAULT_DATE_COLUMN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Pipeline settings, built once by the driver and passed down explicitly
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,

    #[validate(nested)]
    pub reader: ReaderConfig,

    #[validate(nested)]
    pub evaluate: EvaluateConfig,

    #[validate(nested)]
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw station files handed over by the retrieval stage
    pub input_dir: PathBuf,
    /// Vocabulary files and official monthly datasets
    pub prepared_dir: PathBuf,
    /// Derived monthly datasets
    pub processed_dir: PathBuf,
    /// Verdict files and the run report
    pub verdict_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            prepared_dir: PathBuf::from("data/prepared"),
            processed_dir: PathBuf::from("data/processed"),
            verdict_dir: PathBuf::from("data/evaluation"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReaderConfig {
    #[validate(length(min = 1))]
    pub date_column: String,

    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            use_mmap: false,
        }
    }
}

/// What to do when official and derived data share no column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyOverlapPolicy {
    /// Vacuously consistent, empty score line
    #[default]
    Consistent,
    /// Treated as insufficient data; no verdict is written
    Insufficient,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EvaluateConfig {
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,

    pub empty_overlap: EmptyOverlapPolicy,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONSISTENCY_THRESHOLD,
            empty_overlap: EmptyOverlapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProcessingConfig {
    #[validate(range(min = 1, max = 1024))]
    pub max_workers: usize,

    pub show_progress: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    /// Load settings from an optional params file (YAML, TOML or JSON by extension) over the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: PipelineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
