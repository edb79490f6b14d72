//! Validate command implementation

use anyhow::{bail, Context, Result};
use std::path::Path;
use tankobon_core::{load_config_file, TracingReporter};

/// Check the configuration file for invalid rows
pub fn validate(config_path: &Path) -> Result<()> {
    let loaded = load_config_file(config_path, &TracingReporter)
        .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;

    let ignored = loaded.series.iter().filter(|s| s.ignore).count();
    println!("Configuration: {}", config_path.display());
    println!("  Series:   {}", loaded.series.len());
    println!("  Ignored:  {}", ignored);
    println!("  Skipped:  {}", loaded.skipped.len());
    println!("  Rejected: {}", loaded.rejected.len());
    println!("  Defaulted: {}", loaded.defaulted.len());

    for issue in loaded.rejected.iter().chain(&loaded.defaulted) {
        eprintln!("  line {} ({}): {}", issue.line, issue.folder, issue.message);
    }

    if !loaded.is_clean() {
        bail!("Validation failed for {}", config_path.display());
    }

    println!("Valid configuration");
    Ok(())
}
