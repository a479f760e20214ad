pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{discover_stations, StationPaths};
pub use progress::ProgressReporter;
