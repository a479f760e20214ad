pub mod artifact_reader;
pub mod station_reader;

pub use artifact_reader::ArtifactReader;
pub use station_reader::{parse_observation_date, parse_value, StationReader};
