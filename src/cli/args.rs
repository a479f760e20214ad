use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lcd-consistency")]
#[command(about = "Checks station daily observations against their official monthly summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Pipeline params file (YAML, TOML or JSON)")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub paths: PathOverrides,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Worker threads [default: from config, else CPU count]")]
    pub max_workers: Option<usize>,

    #[arg(long, global = true, help = "Disable progress bars")]
    pub no_progress: bool,

    #[arg(long, global = true, help = "Exit with an error if any station failed")]
    pub fail_on_error: bool,
}

/// Directory overrides applied on top of the params file
#[derive(Args, Debug, Default)]
pub struct PathOverrides {
    #[arg(long, global = true, help = "Directory of raw station CSV files")]
    pub input_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for vocabularies and official monthly datasets")]
    pub prepared_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for derived monthly datasets")]
    pub processed_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Directory for verdict files and the run report")]
    pub verdict_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract monthly vocabularies and official monthly datasets
    Prepare,

    /// Aggregate daily observations into derived monthly datasets
    Process,

    /// Score derived against official monthly values and write verdicts
    Evaluate {
        #[arg(long, help = "Minimum R² for a consistent column [default: 0.9]")]
        threshold: Option<f64>,
    },

    /// Run prepare, process and evaluate in sequence
    Run {
        #[arg(long, help = "Minimum R² for a consistent column [default: 0.9]")]
        threshold: Option<f64>,
    },

    /// Show the vocabulary and column reconciliation of one station file
    Inspect {
        #[arg(help = "Raw station CSV file")]
        file: PathBuf,

        #[arg(long, help = "Print as JSON")]
        json: bool,
    },
}
