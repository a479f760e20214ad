/// Field provenance markers
pub const MONTHLY_MARKER: &str = "Monthly";
pub const DAILY_MARKER: &str = "Daily";

/// Name normalization vocabulary
pub const TEMPERATURE: &str = "Temperature";
pub const DRY_BULB_TEMPERATURE: &str = "DryBulbTemperature";
pub const WET_BULB_QUALIFIER: &str = "WetBulb";
pub const DEPARTURE_QUALIFIER: &str = "Departure";

/// Averaging conventions
pub const AVERAGE_QUALIFIER: &str = "Average";
pub const MEAN_QUALIFIER: &str = "Mean";

/// Station file layout
pub const DEFAULT_DATE_COLUMN: &str = "DATE";
pub const MONTH_COLUMN: &str = "Month";
pub const STATION_FILE_EXTENSION: &str = "csv";

/// Accepted date / timestamp formats, tried in order
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d",
    "%Y%m%d",
];

/// Artifact file name suffixes
pub const OFFICIAL_SUFFIX: &str = "_prepare.csv";
pub const VOCABULARY_SUFFIX: &str = ".txt";
pub const DERIVED_SUFFIX: &str = "_process.csv";
pub const VERDICT_SUFFIX: &str = "_r2.txt";
pub const RUN_REPORT_FILE: &str = "run_report.json";

/// Scoring defaults
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.9;
pub const MIN_ALIGNED_ROWS: usize = 2;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
