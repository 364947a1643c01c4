use std::path::PathBuf;
use thiserror::Error;

/// All errors produced at the boundaries of the event statistics tool.
///
/// The aggregation engine itself never fails; these variants only cover
/// file I/O, input decoding and configuration.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A time-window name is not one of the recognised selectors.
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// The input path does not exist.
    #[error("Input path not found: {0}")]
    InputNotFound(PathBuf),

    /// No JSON record files were found under the given directory.
    #[error("No JSON record files found in {0}")]
    NoRecordFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the stats crates.
pub type Result<T> = std::result::Result<T, StatsError>;
