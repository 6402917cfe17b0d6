// XYwow Infrastructure - Snapshot Adapters
// Implements: StandingProvider over a JSON file, play-log file loading

pub mod json_file;

pub use json_file::{read_play_logs, JsonFileStandingProvider};
