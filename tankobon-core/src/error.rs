//! Error types for Tankobon Core

use thiserror::Error;

/// Result type alias using TankobonError
pub type Result<T> = std::result::Result<T, TankobonError>;

/// Top-level error type for all Tankobon operations
#[derive(Debug, Error)]
pub enum TankobonError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in the batch specification or the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(String),

    #[error("Invalid batch sizes: {0}")]
    InvalidBatchSizes(String),

    #[error("Batch sizes must be greater than zero")]
    ZeroBatchSize,

    #[error("Batch sizes add up to more than any folder can hold")]
    BatchSizesOverflow,

    #[error("Batch plan needs {planned} files but only {available} are available")]
    PlanExceedsFiles { planned: usize, available: usize },

    #[error("Invalid boolean value: {0}")]
    InvalidBool(String),

    #[error("Configuration file not found: {0}")]
    MissingFile(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A volume number that could not be read from an existing volume filename.
///
/// Never fatal: the classifier reports it and the file does not contribute
/// to the starting volume.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Unparseable volume number '{digits}' in {file}")]
    UnparseableVolume { file: String, digits: String },
}

/// Errors reading source archives or writing volumes
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to read {name}: {reason}")]
    Read { name: String, reason: String },

    #[error("Failed to write {name}: {reason}")]
    Write { name: String, reason: String },

    #[error("No images found for {name}")]
    NoPages { name: String },
}

/// Errors from the series library (listing, moving, deleting files)
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to move {name} to {folder}: {reason}")]
    Move {
        name: String,
        folder: String,
        reason: String,
    },

    #[error("Failed to delete {name}: {reason}")]
    Delete { name: String, reason: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a whole series
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("Folder '{0}' does not exist")]
    MissingFolder(String),

    #[error("No volume numbers left after the existing volumes of '{0}'")]
    VolumeNumbersExhausted(String),
}
