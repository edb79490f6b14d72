//! Tankobon Core Library
//!
//! This crate turns folders of per-chapter comic archives (CBZ) into
//! per-volume archives. A series folder is classified into specials,
//! existing volumes and regular chapters, the chapters are planned into
//! batches, and each batch is merged into one volume with its pages
//! renumbered consecutively.

pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod library;
pub mod plan;
pub mod processor;
pub mod report;
pub mod runner;
pub mod types;

pub use builder::{BuiltVolume, VolumeBuilder};
pub use classify::{Classification, Classifier};
pub use config::{load_config_file, read_config, LoadedConfig, CONFIG_FILE_NAME};
pub use error::{
    ArchiveError, ClassificationError, ConfigError, LibraryError, Result, SeriesError,
    TankobonError,
};
pub use library::{ArchiveEntry, ArchiveStore, LocalLibrary, MemoryLibrary, SeriesLibrary};
pub use plan::{plan_batches, BatchKind, PlannedBatch};
pub use processor::{SeriesPreview, SeriesProcessor, SeriesReport};
pub use report::{Level, RecordingReporter, Reporter, TracingReporter};
pub use runner::{run_library, RunSummary};
pub use types::{BatchSpec, FileKind, PageEntry, SeriesConfig, SourceFile};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_config_creation() {
        let config = SeriesConfig::new("Test Series", BatchSpec::Repeating(5));
        assert_eq!(config.folder, "Test Series");
        assert_eq!(config.batch, BatchSpec::Repeating(5));
    }
}
