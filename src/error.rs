use crate::models::StationId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed input for station {station}: {message}")]
    MalformedInput { station: StationId, message: String },

    #[error("Insufficient data for station {station}: {aligned_rows} aligned month rows, need at least 2")]
    InsufficientData {
        station: StationId,
        aligned_rows: usize,
    },

    #[error("Missing {artifact} for station {station}")]
    MissingCorrespondence {
        station: StationId,
        artifact: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl ProcessingError {
    /// Short machine-readable tag used in run reports
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::Io(_) => "io",
            ProcessingError::Csv(_) => "csv",
            ProcessingError::Json(_) => "json",
            ProcessingError::MalformedInput { .. } => "malformed_input",
            ProcessingError::InsufficientData { .. } => "insufficient_data",
            ProcessingError::MissingCorrespondence { .. } => "missing_correspondence",
            ProcessingError::Config(_) => "config",
            ProcessingError::Validation(_) => "validation",
            ProcessingError::InvalidFormat(_) => "invalid_format",
            ProcessingError::ThreadPool(_) => "thread_pool",
        }
    }
}
