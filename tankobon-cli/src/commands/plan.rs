//! Plan command implementation

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use tankobon_core::{load_config_file, LocalLibrary, SeriesPreview, SeriesProcessor, TracingReporter};

/// Plan of one series, or why it could not be planned
#[derive(Serialize)]
struct PlanOutput {
    series: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<SeriesPreview>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Show how each configured series would be split into volumes
pub fn plan(directory: &str, config_path: &Path, json: bool) -> Result<()> {
    let reporter = TracingReporter;
    let loaded = load_config_file(config_path, &reporter)
        .with_context(|| format!("Failed to load configuration: {}", config_path.display()))?;

    let library = LocalLibrary::new(directory);
    let processor = SeriesProcessor::new(&library, &reporter);

    let outputs: Vec<PlanOutput> = loaded
        .series
        .iter()
        .filter(|config| !config.ignore)
        .map(|config| match processor.preview(config) {
            Ok(preview) => PlanOutput {
                series: config.folder.clone(),
                preview: Some(preview),
                error: None,
            },
            Err(e) => PlanOutput {
                series: config.folder.clone(),
                preview: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        for output in &outputs {
            print_plan(output);
        }
    }

    let errors = outputs.iter().filter(|o| o.error.is_some()).count();
    if errors > 0 {
        bail!("{} series could not be planned", errors);
    }

    Ok(())
}

fn print_plan(output: &PlanOutput) {
    let Some(preview) = &output.preview else {
        println!("{}: {}", output.series, output.error.as_deref().unwrap_or("unknown error"));
        return;
    };

    let config = &preview.config;
    println!(
        "{} (batch: {}, no-extra: {}, avoid-volumes: {}, delete: {})",
        output.series,
        config.batch,
        !config.merge_leftovers,
        config.avoid_volumes,
        config.delete_originals
    );

    let specials: Vec<&str> = preview
        .classification
        .specials
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    if !specials.is_empty() {
        println!("  Specials:         {}", specials.join(", "));
    }

    let existing: Vec<&str> = preview
        .classification
        .existing_volumes
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    if !existing.is_empty() {
        println!("  Existing volumes: {}", existing.join(", "));
    }

    for volume in &preview.volumes {
        let first = volume.sources.first().map(String::as_str).unwrap_or_default();
        let last = volume.sources.last().map(String::as_str).unwrap_or_default();
        println!(
            "  V{:03} <- {} .. {} ({} chapters)",
            volume.volume,
            first,
            last,
            volume.sources.len()
        );
    }

    if !preview.leftovers.is_empty() {
        println!("  Leftovers:        {}", preview.leftovers.join(", "));
    }
    if preview.plan.is_empty() {
        println!("  Nothing to merge");
    }
}
