//! Run command implementation

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tankobon_core::{load_config_file, run_library, LocalLibrary, TracingReporter};
use tracing::info;

/// Merge chapters into volumes for every configured series
pub fn run(directory: &str, config_path: &Path, json: bool) -> Result<()> {
    let reporter = TracingReporter;

    info!("=== CBZ Refactoring Started ===");
    info!("Base directory: {}", directory);

    let loaded = load_config_file(config_path, &reporter)
        .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;

    if loaded.series.is_empty() {
        println!("No series configured in {}", config_path.display());
        return Ok(());
    }

    // Set up progress tracking
    let progress = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(loaded.series.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")?
            .progress_chars("##-"),
    );

    let library = LocalLibrary::new(directory);
    let mut started = 0;
    let summary = run_library(&library, &loaded.series, &reporter, |config| {
        progress.set_position(started);
        progress.set_message(config.folder.clone());
        started += 1;
    });
    progress.finish_and_clear();

    info!("=== Refactoring complete! ===");

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let leftovers: usize = summary.processed.iter().map(|r| r.leftovers.len()).sum();
        let failed_batches: usize = summary
            .processed
            .iter()
            .map(|r| r.failed_batches.len())
            .sum();

        println!("\nRefactoring complete:");
        println!("  Series:          {}", summary.processed.len());
        println!("  Volumes created: {}", summary.volumes_created());
        println!("  Leftovers:       {}", leftovers);
        println!("  Ignored:         {}", summary.ignored.len());
        println!("  Failed batches:  {}", failed_batches);
        println!("  Failed series:   {}", summary.failed.len());
    }

    if summary.has_failures() {
        bail!("Refactoring completed with errors, see the log for details");
    }

    Ok(())
}
