//! Runs every configured series of a library, one after another

use crate::library::{ArchiveStore, SeriesLibrary};
use crate::processor::{SeriesProcessor, SeriesReport};
use crate::report::Reporter;
use crate::types::SeriesConfig;
use serde::Serialize;

/// A series that could not be processed at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesFailure {
    pub series: String,
    pub reason: String,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: Vec<SeriesReport>,
    pub failed: Vec<SeriesFailure>,
    pub ignored: Vec<String>,
}

impl RunSummary {
    /// Number of volumes written across all series
    pub fn volumes_created(&self) -> usize {
        self.processed.iter().map(|r| r.volumes.len()).sum()
    }

    /// Whether any series failed or had failures inside it
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.processed.iter().any(SeriesReport::has_failures)
    }
}

/// Process `configs` in order.
///
/// A failing series is reported and recorded; later series still run.
/// `on_series` is called once per config, before it is handled.
pub fn run_library<L, F>(
    library: &L,
    configs: &[SeriesConfig],
    reporter: &dyn Reporter,
    mut on_series: F,
) -> RunSummary
where
    L: ArchiveStore + SeriesLibrary + ?Sized,
    F: FnMut(&SeriesConfig),
{
    let processor = SeriesProcessor::new(library, reporter);
    let mut summary = RunSummary::default();

    for config in configs {
        on_series(config);

        if config.ignore {
            reporter.info(&format!(
                "Series '{}' marked as ignored. Skipping.",
                config.folder
            ));
            summary.ignored.push(config.folder.clone());
            continue;
        }

        match processor.process(config) {
            Ok(report) => summary.processed.push(report),
            Err(e) => {
                reporter.error(&format!("Series '{}' failed: {}", config.folder, e));
                summary.failed.push(SeriesFailure {
                    series: config.folder.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    summary
}
