use crate::config::PathsConfig;
use crate::error::Result;
use crate::models::StationId;
use crate::utils::constants::{
    DERIVED_SUFFIX, OFFICIAL_SUFFIX, STATION_FILE_EXTENSION, VERDICT_SUFFIX, VOCABULARY_SUFFIX,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Every artifact path of one station, derived from its id and the configured directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationPaths {
    pub station: StationId,
    pub raw: PathBuf,
    pub vocabulary: PathBuf,
    pub official: PathBuf,
    pub derived: PathBuf,
    pub verdict: PathBuf,
}

impl StationPaths {
    pub fn new(station: &StationId, paths: &PathsConfig) -> Self {
        let id = station.as_str();
        Self {
            station: station.clone(),
            raw: paths
                .input_dir
                .join(format!("{}.{}", id, STATION_FILE_EXTENSION)),
            vocabulary: paths
                .prepared_dir
                .join(format!("{}{}", id, VOCABULARY_SUFFIX)),
            official: paths.prepared_dir.join(format!("{}{}", id, OFFICIAL_SUFFIX)),
            derived: paths.processed_dir.join(format!("{}{}", id, DERIVED_SUFFIX)),
            verdict: paths.verdict_dir.join(format!("{}{}", id, VERDICT_SUFFIX)),
        }
    }
}

/// Station ids of all raw station files in a directory, sorted for a stable processing order
pub fn discover_stations(input_dir: &Path) -> Result<Vec<StationId>> {
    let mut stations = Vec::new();

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();

        if !path.is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(STATION_FILE_EXTENSION)
        {
            continue;
        }

        stations.push(StationId::from_path(&path)?);
    }

    stations.sort();
    Ok(stations)
}
