use crate::cli::args::{Cli, Commands, PathOverrides};
use crate::cli::logging::init_logging;
use crate::config::PipelineConfig;
use crate::models::StationId;
use crate::processors::{Pipeline, RunReport, Stage, StationInspection};
use anyhow::{bail, Context, Result};
use tracing::info;
use validator::Validate;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading pipeline config")?;
    apply_path_overrides(&mut config, &cli.paths);
    if let Some(max_workers) = cli.max_workers {
        config.processing.max_workers = max_workers;
    }
    if cli.no_progress {
        config.processing.show_progress = false;
    }

    let stages: Vec<Stage> = match cli.command {
        Commands::Prepare => vec![Stage::Prepare],
        Commands::Process => vec![Stage::Process],
        Commands::Evaluate { threshold } => {
            if let Some(threshold) = threshold {
                config.evaluate.threshold = threshold;
            }
            vec![Stage::Evaluate]
        }
        Commands::Run { threshold } => {
            if let Some(threshold) = threshold {
                config.evaluate.threshold = threshold;
            }
            Stage::ALL.to_vec()
        }
        Commands::Inspect { file, json } => {
            config.validate().context("validating pipeline config")?;
            let pipeline = Pipeline::new(config);
            let inspection = pipeline.inspect(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&inspection)?);
            } else {
                print_inspection(&inspection);
            }
            return Ok(());
        }
    };

    config.validate().context("validating pipeline config")?;
    info!(
        input_dir = %config.paths.input_dir.display(),
        workers = config.processing.max_workers,
        threshold = config.evaluate.threshold,
        "Starting pipeline"
    );

    let silent = !config.processing.show_progress;
    let pipeline = Pipeline::new(config);
    let stations = pipeline
        .discover_stations()
        .with_context(|| format!("listing {}", pipeline.config().paths.input_dir.display()))?;
    if stations.is_empty() {
        println!(
            "No station files found in {}",
            pipeline.config().paths.input_dir.display()
        );
        return Ok(());
    }

    let report = run_blocking(pipeline, stages, stations, silent).await?;
    if report.has_failures() && cli.fail_on_error {
        bail!("{} station runs failed", report.failures().count());
    }

    Ok(())
}

async fn run_blocking(
    pipeline: Pipeline,
    stages: Vec<Stage>,
    stations: Vec<StationId>,
    silent: bool,
) -> Result<RunReport> {
    let report = tokio::task::spawn_blocking(move || -> crate::error::Result<RunReport> {
        let report = pipeline.run(&stages, &stations, silent)?;
        println!("\n{}", report.summary());

        if stages.contains(&Stage::Evaluate) {
            let path = pipeline.write_report(&report)?;
            println!("Run report written to {}", path.display());
        }

        Ok(report)
    })
    .await??;

    Ok(report)
}

fn apply_path_overrides(config: &mut PipelineConfig, overrides: &PathOverrides) {
    if let Some(dir) = &overrides.input_dir {
        config.paths.input_dir = dir.clone();
    }
    if let Some(dir) = &overrides.prepared_dir {
        config.paths.prepared_dir = dir.clone();
    }
    if let Some(dir) = &overrides.processed_dir {
        config.paths.processed_dir = dir.clone();
    }
    if let Some(dir) = &overrides.verdict_dir {
        config.paths.verdict_dir = dir.clone();
    }
}

fn print_inspection(inspection: &StationInspection) {
    println!("Station: {}", inspection.station);
    println!(
        "Rows: {} usable, {} rejected",
        inspection.rows, inspection.rejected_rows
    );
    println!(
        "\nMonthly vocabulary ({} names, {} official rows):",
        inspection.vocabulary.len(),
        inspection.official_rows
    );
    for name in inspection.vocabulary.iter() {
        println!("  • {}", name);
    }

    println!("\nReconciled daily columns ({}):", inspection.matches.len());
    for column in &inspection.matches {
        println!(
            "  {} → {} ({})",
            column.daily_field, column.canonical, column.rule
        );
    }
    println!("\nDerived months: {}", inspection.derived_months);
}
