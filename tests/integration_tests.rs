use lcd_consistency::config::{PathsConfig, PipelineConfig};
use lcd_consistency::models::{Classification, StationId};
use lcd_consistency::processors::{Pipeline, Stage, StationStatus};
use lcd_consistency::readers::ArtifactReader;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "STATION,DATE,REPORT_TYPE,DailyAverageDryBulbTemperature,DailyPrecipitation,DailyPeakWindSpeed,MonthlyMeanTemperature,MonthlyTotalLiquidPrecipitation";

fn station_csv(monthly_temps: [f64; 3]) -> String {
    let mut lines = vec![HEADER.to_string()];
    let days = [
        ("2023-01-01T23:59:00", 10.0, 1.0),
        ("2023-01-02T23:59:00", 20.0, 3.0),
        ("2023-02-01T23:59:00", 20.0, 0.0),
        ("2023-02-02T23:59:00", 30.0, 2.0),
        ("2023-03-01T23:59:00", 30.0, 4.0),
        ("2023-03-02T23:59:00", 50.0, 4.0),
    ];
    for (date, temp, precip) in days {
        lines.push(format!("S1,{},SOD,{},{},17", date, temp, precip));
    }

    let month_ends = ["2023-01-31T23:59:00", "2023-02-28T23:59:00", "2023-03-31T23:59:00"];
    let monthly_precip = [2.0, 1.0, 4.0];
    for i in 0..3 {
        lines.push(format!(
            "S1,{},SOM,,,,{},{}",
            month_ends[i], monthly_temps[i], monthly_precip[i]
        ));
    }

    lines.join("\n") + "\n"
}

fn setup(root: &Path) -> Pipeline {
    let raw = root.join("raw");
    fs::create_dir_all(&raw).unwrap();

    fs::write(raw.join("consistent.csv"), station_csv([15.0, 25.0, 40.0])).unwrap();
    fs::write(raw.join("drifting.csv"), station_csv([20.0, 20.0, 45.0])).unwrap();
    fs::write(
        raw.join("nodate.csv"),
        "STATION,DailyPrecipitation,MonthlyTotalLiquidPrecipitation\nS1,1.0,\n",
    )
    .unwrap();
    fs::write(
        raw.join("short.csv"),
        format!(
            "{}\nS1,2023-01-01,SOD,10,1,5,,\nS1,2023-01-31,SOM,,,,10,1\n",
            HEADER
        ),
    )
    .unwrap();

    let mut config = PipelineConfig::default();
    config.paths = PathsConfig {
        input_dir: raw,
        prepared_dir: root.join("prepared"),
        processed_dir: root.join("processed"),
        verdict_dir: root.join("evaluation"),
    };
    config.processing.max_workers = 2;
    Pipeline::new(config)
}

#[test]
fn test_full_pipeline_run() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let pipeline = setup(temp_dir.path());

    let stations = pipeline.discover_stations().unwrap();
    assert_eq!(
        stations,
        vec![
            StationId::new("consistent"),
            StationId::new("drifting"),
            StationId::new("nodate"),
            StationId::new("short"),
        ]
    );

    let report = pipeline.run(&Stage::ALL, &stations, true).unwrap();
    assert_eq!(report.outcomes.len(), 12);

    // Vocabulary written by prepare is what process reconciled against
    let consistent = pipeline.station_paths(&StationId::new("consistent"));
    let vocabulary =
        ArtifactReader::read_vocabulary(&consistent.vocabulary, &StationId::new("consistent")).unwrap();
    assert_eq!(
        vocabulary.to_line(),
        "MeanDryBulbTemperature,TotalLiquidPrecipitation"
    );

    let derived = fs::read_to_string(&consistent.derived).unwrap();
    assert_eq!(
        derived,
        "Month,MeanDryBulbTemperature,TotalLiquidPrecipitation\n1,15,2\n2,25,1\n3,40,4\n"
    );

    let official = fs::read_to_string(&consistent.official).unwrap();
    assert_eq!(
        official,
        "Month,MeanDryBulbTemperature,TotalLiquidPrecipitation\n1,15,2\n2,25,1\n3,40,4\n"
    );

    assert_eq!(
        fs::read_to_string(&consistent.verdict).unwrap(),
        "Consistent\n1.0,1.0"
    );

    let drifting = pipeline.station_paths(&StationId::new("drifting"));
    let verdict = fs::read_to_string(&drifting.verdict).unwrap();
    let mut lines = verdict.lines();
    assert_eq!(lines.next(), Some("Inconsistent"));
    let scores: Vec<f64> = lines
        .next()
        .unwrap()
        .split(',')
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(scores.len(), 2);
    assert!(scores[0] < 0.9);
    assert_eq!(scores[1], 1.0);

    // Failed stations get no verdict and do not stop the others
    assert!(!pipeline.station_paths(&StationId::new("nodate")).verdict.exists());
    assert!(!pipeline.station_paths(&StationId::new("short")).verdict.exists());

    let failure_kinds: Vec<(String, Stage, String)> = report
        .failures()
        .map(|o| match &o.status {
            StationStatus::Failed { kind, .. } => (o.station.to_string(), o.stage, kind.clone()),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(
        failure_kinds,
        vec![
            ("nodate".to_string(), Stage::Prepare, "malformed_input".to_string()),
            ("nodate".to_string(), Stage::Process, "missing_correspondence".to_string()),
            ("nodate".to_string(), Stage::Evaluate, "missing_correspondence".to_string()),
            ("short".to_string(), Stage::Evaluate, "insufficient_data".to_string()),
        ]
    );
    assert_eq!(report.count_classification(Classification::Consistent), 1);
    assert_eq!(report.count_classification(Classification::Inconsistent), 1);

    let report_path = pipeline.write_report(&report).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["outcomes"].as_array().unwrap().len(), 12);
    assert_eq!(json["outcomes"][0]["station"], "consistent");
    assert_eq!(json["outcomes"][0]["stage"], "prepare");
    assert_eq!(json["outcomes"][0]["status"], "prepared");
}

#[test]
fn test_inspect_reports_reconciliation() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let pipeline = setup(temp_dir.path());

    let inspection = pipeline
        .inspect(&temp_dir.path().join("raw").join("consistent.csv"))
        .unwrap();

    assert_eq!(inspection.station, StationId::new("consistent"));
    assert_eq!(inspection.rows, 9);
    assert_eq!(inspection.official_rows, 3);
    assert_eq!(inspection.derived_months, 3);

    let matched: Vec<(&str, &str)> = inspection
        .matches
        .iter()
        .map(|m| (m.daily_field.as_str(), m.canonical.as_str()))
        .collect();
    assert_eq!(
        matched,
        vec![
            ("DailyAverageDryBulbTemperature", "MeanDryBulbTemperature"),
            ("DailyPrecipitation", "TotalLiquidPrecipitation"),
        ]
    );
    // Nothing is written
    assert!(!temp_dir.path().join("prepared").exists());
}
