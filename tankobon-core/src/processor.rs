//! Series processor: classify, relocate specials, plan and build volumes

use crate::builder::{BuiltVolume, VolumeBuilder};
use crate::classify::{Classification, Classifier};
use crate::error::{Result, SeriesError};
use crate::library::{ArchiveStore, SeriesLibrary, SPECIALS_FOLDER};
use crate::plan::{leftover_count, plan_batches, plan_sizes, BatchKind, PlannedBatch};
use crate::report::Reporter;
use crate::types::{Batch, SeriesConfig, SourceFile};
use serde::Serialize;

/// A volume batch that could not be built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBatch {
    /// Volume number the batch was meant to become
    pub volume: u32,
    pub sources: Vec<String>,
    pub reason: String,
}

/// Outcome of processing one series
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeriesReport {
    pub series: String,
    pub specials_moved: Vec<String>,
    /// Specials that could not be moved, with the reason
    pub special_move_failures: Vec<String>,
    pub existing_volumes: Vec<String>,
    pub start_volume: Option<u32>,
    pub plan: Vec<PlannedBatch>,
    pub volumes: Vec<BuiltVolume>,
    pub failed_batches: Vec<FailedBatch>,
    /// Chapters left as individual archives
    pub leftovers: Vec<String>,
}

impl SeriesReport {
    fn new(series: &str) -> Self {
        Self {
            series: series.to_string(),
            start_volume: Some(1),
            ..Default::default()
        }
    }

    /// Whether anything went wrong, including non-fatal failures
    pub fn has_failures(&self) -> bool {
        !self.failed_batches.is_empty()
            || !self.special_move_failures.is_empty()
            || self
                .volumes
                .iter()
                .any(|v| !v.deletion_failures.is_empty())
    }
}

/// What a series would turn into, without touching any file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPreview {
    pub config: SeriesConfig,
    pub classification: Classification,
    pub plan: Vec<PlannedBatch>,
    pub volumes: Vec<PlannedVolume>,
    pub leftovers: Vec<String>,
}

/// A volume a preview expects to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedVolume {
    pub volume: u32,
    pub sources: Vec<String>,
}

/// Runs one series through the whole pipeline
pub struct SeriesProcessor<'a, L: ?Sized> {
    library: &'a L,
    reporter: &'a dyn Reporter,
    classifier: Classifier,
}

impl<'a, L> SeriesProcessor<'a, L>
where
    L: ArchiveStore + SeriesLibrary + ?Sized,
{
    pub fn new(library: &'a L, reporter: &'a dyn Reporter) -> Self {
        Self {
            library,
            reporter,
            classifier: Classifier::new(),
        }
    }

    /// Process one series.
    ///
    /// Errors abort this series only: a missing folder, a listing failure or
    /// a batch plan that does not fit the folder. Failed batches, failed
    /// special moves and failed deletions are reported and recorded in the
    /// returned report instead.
    pub fn process(&self, config: &SeriesConfig) -> Result<SeriesReport> {
        let series = config.folder.as_str();
        let mut report = SeriesReport::new(series);

        self.reporter.info(&format!(
            "Processing: {} (batch: {}, no-extra: {}, avoid-volumes: {}, delete: {})",
            series,
            config.batch,
            !config.merge_leftovers,
            config.avoid_volumes,
            config.delete_originals
        ));

        let Some(archives) = self.list_series(series)? else {
            return Ok(report);
        };

        let classification = self
            .classifier
            .classify(&archives, config.avoid_volumes, self.reporter);
        report.start_volume = classification.start_volume;
        report.existing_volumes = names(&classification.existing_volumes);

        self.move_specials(series, &classification.specials, &mut report);
        self.log_existing_volumes(&classification);

        let regular = &classification.regular;
        if regular.is_empty() {
            self.reporter
                .info(&format!("No regular CBZ files to process in {}", series));
            return Ok(report);
        }

        let plan = self.plan(config, regular.len())?;
        report.plan = plan.clone();
        let first_volume = first_volume_number(series, classification.start_volume, &plan)
            .map_err(|e| {
                self.reporter.error(&e.to_string());
                e
            })?;

        let builder = VolumeBuilder::new(self.library, self.reporter);
        let mut built: u32 = 0;
        let mut offset = 0;

        for batch in &plan {
            let files = &regular[offset..offset + batch.size];
            offset += batch.size;

            match batch.kind {
                BatchKind::Leftover => report.leftovers.extend(names(files)),
                BatchKind::Volume => {
                    let volume = first_volume + built;
                    self.reporter.info(&format!(
                        "Processing batch {} ({} files)...",
                        volume,
                        files.len()
                    ));
                    match builder.build(series, &Batch::new(volume, files), config.delete_originals) {
                        Ok(volume_built) => {
                            report.volumes.push(volume_built);
                            built += 1;
                        }
                        Err(e) => report.failed_batches.push(FailedBatch {
                            volume,
                            sources: names(files),
                            reason: e.to_string(),
                        }),
                    }
                }
            }
        }

        if !report.leftovers.is_empty() {
            self.reporter.info(&format!(
                "Left {} files as individual CBZ files: {:?}",
                report.leftovers.len(),
                report.leftovers
            ));
        }

        Ok(report)
    }

    /// Classify and plan a series without moving, writing or deleting anything
    pub fn preview(&self, config: &SeriesConfig) -> Result<SeriesPreview> {
        let series = config.folder.as_str();
        let archives = self.list_series(series)?.unwrap_or_default();
        let classification = self
            .classifier
            .classify(&archives, config.avoid_volumes, self.reporter);
        let plan = plan_batches(classification.regular.len(), &config.batch, config.merge_leftovers)?;
        let first_volume = first_volume_number(series, classification.start_volume, &plan)?;

        let mut volumes = Vec::new();
        let mut leftovers = Vec::new();
        let mut offset = 0;
        for batch in &plan {
            let files = &classification.regular[offset..offset + batch.size];
            offset += batch.size;
            match batch.kind {
                BatchKind::Leftover => leftovers.extend(names(files)),
                BatchKind::Volume => volumes.push(PlannedVolume {
                    volume: first_volume + volumes.len() as u32,
                    sources: names(files),
                }),
            }
        }

        Ok(SeriesPreview {
            config: config.clone(),
            classification,
            plan,
            volumes,
            leftovers,
        })
    }

    /// Archive names of a series, or `None` when there is nothing to do
    fn list_series(&self, series: &str) -> Result<Option<Vec<String>>> {
        if !self.library.series_exists(series)? {
            self.reporter
                .error(&format!("Folder '{}' does not exist. Skipping.", series));
            return Err(SeriesError::MissingFolder(series.to_string()).into());
        }

        let archives = self.library.list_archives(series)?;
        if archives.is_empty() {
            self.reporter
                .info(&format!("No CBZ files found in {}", series));
            return Ok(None);
        }
        Ok(Some(archives))
    }

    fn move_specials(&self, series: &str, specials: &[SourceFile], report: &mut SeriesReport) {
        for special in specials {
            match self
                .library
                .move_to_subfolder(series, &special.name, SPECIALS_FOLDER)
            {
                Ok(()) => {
                    self.reporter
                        .info(&format!("Moved to Specials: {}", special.name));
                    report.specials_moved.push(special.name.clone());
                }
                Err(e) => {
                    self.reporter.error(&format!(
                        "Failed to move {} to Specials: {}",
                        special.name, e
                    ));
                    report.special_move_failures.push(e.to_string());
                }
            }
        }
    }

    fn log_existing_volumes(&self, classification: &Classification) {
        if classification.existing_volumes.is_empty() {
            return;
        }

        self.reporter.info(&format!(
            "Skipping {} files with volume pattern: {:?}",
            classification.existing_volumes.len(),
            names(&classification.existing_volumes)
        ));
        if let Some(start) = classification.start_volume.filter(|&start| start > 1) {
            self.reporter.info(&format!(
                "Found existing volumes up to V{:03}, starting new volumes from V{:03}",
                start - 1,
                start
            ));
        }
    }

    fn plan(&self, config: &SeriesConfig, file_count: usize) -> Result<Vec<PlannedBatch>> {
        let plan = plan_batches(file_count, &config.batch, config.merge_leftovers).map_err(|e| {
            self.reporter.error(&format!(
                "Invalid batch configuration for '{}': {}",
                config.folder, e
            ));
            e
        })?;

        let volume_sizes: Vec<usize> = plan
            .iter()
            .filter(|b| b.is_volume())
            .map(|b| b.size)
            .collect();
        let leftovers = leftover_count(&plan);
        if leftovers > 0 {
            self.reporter.info(&format!(
                "With no-extra: {} files will remain as individual CBZ files",
                leftovers
            ));
        }
        self.reporter.info(&format!(
            "Will create {} volumes with sizes: {:?}",
            volume_sizes.len(),
            volume_sizes
        ));
        self.reporter
            .debug(&format!("Batch plan for {}: {:?}", config.folder, plan_sizes(&plan)));

        Ok(plan)
    }
}

/// First new volume number, provided every volume of `plan` gets a number
fn first_volume_number(
    series: &str,
    start: Option<u32>,
    plan: &[PlannedBatch],
) -> std::result::Result<u32, SeriesError> {
    let exhausted = || SeriesError::VolumeNumbersExhausted(series.to_string());
    let start = start.ok_or_else(exhausted)?;

    let volumes = plan.iter().filter(|b| b.is_volume()).count();
    if volumes > 1 {
        u32::try_from(volumes - 1)
            .ok()
            .and_then(|extra| start.checked_add(extra))
            .ok_or_else(exhausted)?;
    }
    Ok(start)
}

fn names(files: &[SourceFile]) -> Vec<String> {
    files.iter().map(|f| f.name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, TankobonError};
    use crate::library::{ArchiveEntry, MemoryLibrary};
    use crate::report::{Level, RecordingReporter};
    use crate::types::BatchSpec;

    fn chapter(pages: usize) -> Vec<ArchiveEntry> {
        (1..=pages)
            .map(|p| ArchiveEntry::new(format!("{:02}.jpg", p), vec![p as u8]))
            .chain(std::iter::once(ArchiveEntry::new("ComicInfo.xml", vec![])))
            .collect()
    }

    fn library_with(series: &str, names: &[&str]) -> MemoryLibrary {
        let library = MemoryLibrary::new();
        library.add_series(series);
        for name in names {
            library.add_archive(series, name, chapter(2));
        }
        library
    }

    #[test]
    fn test_specials_moved_and_excluded() {
        let library = library_with("S", &["c01.cbz", "c02.cbz", "SP01.cbz"]);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(2));

        let report = SeriesProcessor::new(&library, &reporter)
            .process(&config)
            .unwrap();

        assert_eq!(report.specials_moved, vec!["SP01.cbz"]);
        assert_eq!(library.archive_names("S/Specials"), vec!["SP01.cbz"]);
        assert_eq!(report.volumes.len(), 1);
        assert_eq!(report.volumes[0].sources, vec!["c01.cbz", "c02.cbz"]);
        assert_eq!(library.archive_names("S"), vec!["S V001.cbz"]);
        assert!(reporter.contains(Level::Info, "Moved to Specials: SP01.cbz"));
    }

    #[test]
    fn test_continues_after_existing_volumes() {
        let library = library_with(
            "S",
            &["chap01.cbz", "chap02.cbz", "chap03.cbz", "chap04.cbz", "chap05.cbz", "V001.cbz"],
        );
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(5)).with_delete_originals(false);

        let report = SeriesProcessor::new(&library, &reporter)
            .process(&config)
            .unwrap();

        assert_eq!(report.start_volume, Some(2));
        assert_eq!(report.existing_volumes, vec!["V001.cbz"]);
        assert_eq!(report.volumes[0].name, "S V002.cbz");
        assert!(library.archive("S", "V001.cbz").is_some());
        assert!(reporter.contains(Level::Info, "starting new volumes from V002"));
    }

    #[test]
    fn test_leftovers_are_untouched() {
        let names: Vec<String> = (1..=12).map(|i| format!("c{:02}.cbz", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let library = library_with("S", &refs);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(5));

        let report = SeriesProcessor::new(&library, &reporter)
            .process(&config)
            .unwrap();

        assert_eq!(plan_sizes(&report.plan), vec![5, 5, 1, 1]);
        assert_eq!(report.volumes.len(), 2);
        assert_eq!(report.leftovers, vec!["c11.cbz", "c12.cbz"]);
        assert_eq!(
            library.archive_names("S"),
            vec!["S V001.cbz", "S V002.cbz", "c11.cbz", "c12.cbz"]
        );
        assert_eq!(library.archive("S", "c11.cbz").unwrap(), chapter(2));
    }

    #[test]
    fn test_failed_batch_does_not_consume_number() {
        let library = library_with("S", &["c1.cbz", "c2.cbz", "c3.cbz"]);
        library.mark_unreadable("S", "c1.cbz");
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(1));

        let report = SeriesProcessor::new(&library, &reporter)
            .process(&config)
            .unwrap();

        assert_eq!(report.failed_batches.len(), 1);
        assert_eq!(report.failed_batches[0].sources, vec!["c1.cbz"]);
        let created: Vec<&str> = report.volumes.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(created, vec!["S V001.cbz", "S V002.cbz"]);
        assert!(library.archive("S", "c1.cbz").is_some());
        assert!(report.has_failures());
    }

    #[test]
    fn test_missing_folder() {
        let library = MemoryLibrary::new();
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("Nope", BatchSpec::Repeating(3));

        let result = SeriesProcessor::new(&library, &reporter).process(&config);
        assert!(matches!(
            result,
            Err(TankobonError::Series(SeriesError::MissingFolder(_)))
        ));
        assert!(reporter.contains(Level::Error, "does not exist"));
    }

    #[test]
    fn test_plan_too_large_fails_series() {
        let library = library_with("S", &["c1.cbz", "c2.cbz"]);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Explicit(vec![2, 2]));

        let result = SeriesProcessor::new(&library, &reporter).process(&config);
        assert!(matches!(
            result,
            Err(TankobonError::Config(ConfigError::PlanExceedsFiles { .. }))
        ));
        assert_eq!(library.archive_names("S"), vec!["c1.cbz", "c2.cbz"]);
    }

    #[test]
    fn test_volume_numbers_exhausted_fails_series() {
        let library = library_with("S", &["c1.cbz", "c2.cbz", "V4294967295.cbz"]);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(1));
        let processor = SeriesProcessor::new(&library, &reporter);

        let result = processor.process(&config);
        assert!(matches!(
            result,
            Err(TankobonError::Series(SeriesError::VolumeNumbersExhausted(_)))
        ));
        assert!(processor.preview(&config).is_err());
        assert_eq!(
            library.archive_names("S"),
            vec!["V4294967295.cbz", "c1.cbz", "c2.cbz"]
        );
        assert!(reporter.contains(Level::Error, "No volume numbers left"));
    }

    #[test]
    fn test_plan_reaching_last_volume_number() {
        let library = library_with("S", &["c1.cbz", "c2.cbz", "V4294967293.cbz"]);
        let reporter = RecordingReporter::new();
        let processor = SeriesProcessor::new(&library, &reporter);

        let preview = processor
            .preview(&SeriesConfig::new("S", BatchSpec::Repeating(1)))
            .unwrap();
        let numbers: Vec<u32> = preview.volumes.iter().map(|v| v.volume).collect();
        assert_eq!(numbers, vec![u32::MAX - 1, u32::MAX]);

        let library = library_with("S", &["c1.cbz", "c2.cbz", "c3.cbz", "V4294967293.cbz"]);
        let result = SeriesProcessor::new(&library, &reporter)
            .process(&SeriesConfig::new("S", BatchSpec::Repeating(1)));
        assert!(matches!(
            result,
            Err(TankobonError::Series(SeriesError::VolumeNumbersExhausted(_)))
        ));
        assert_eq!(library.archive_names("S").len(), 4);
    }

    #[test]
    fn test_empty_series() {
        let library = library_with("S", &[]);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(3));

        let report = SeriesProcessor::new(&library, &reporter)
            .process(&config)
            .unwrap();
        assert!(report.plan.is_empty());
        assert!(reporter.contains(Level::Info, "No CBZ files found in S"));
    }

    #[test]
    fn test_preview_has_no_side_effects() {
        let library = library_with("S", &["c1.cbz", "c2.cbz", "c3.cbz", "SP01.cbz", "V004.cbz"]);
        let reporter = RecordingReporter::new();
        let config = SeriesConfig::new("S", BatchSpec::Repeating(2));

        let preview = SeriesProcessor::new(&library, &reporter)
            .preview(&config)
            .unwrap();

        assert_eq!(preview.volumes.len(), 1);
        assert_eq!(preview.volumes[0].volume, 5);
        assert_eq!(preview.volumes[0].sources, vec!["c1.cbz", "c2.cbz"]);
        assert_eq!(preview.leftovers, vec!["c3.cbz"]);
        assert_eq!(library.archive_names("S").len(), 5);
    }
}
