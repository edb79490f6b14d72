//! Library configuration loaded from `to_refactor.csv`
//!
//! One row per series, no header:
//!
//! ```text
//! folder, batch_sizes, no_extra, avoid_volumes, delete, ignore
//! ```
//!
//! `batch_sizes` is either one number (repeated) or a quoted comma-separated
//! list. The four flags are optional and default to `true, true, true, false`.
//! Lines starting with `#` are comments.

use crate::error::ConfigError;
use crate::report::Reporter;
use crate::types::{BatchSpec, SeriesConfig};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration file looked up in the library root
pub const CONFIG_FILE_NAME: &str = "to_refactor.csv";

const DEFAULT_NO_EXTRA: bool = true;
const DEFAULT_AVOID_VOLUMES: bool = true;
const DEFAULT_DELETE: bool = true;
const DEFAULT_IGNORE: bool = false;

/// A configuration row that needs attention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Line number in the file (1-based)
    pub line: u64,
    pub folder: String,
    pub message: String,
}

/// Everything read from a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadedConfig {
    /// Accepted series, in file order (ignored series included)
    pub series: Vec<SeriesConfig>,
    /// Rows without a batch size, intentionally skipped
    pub skipped: Vec<RowIssue>,
    /// Rows with an invalid batch size or no folder name
    pub rejected: Vec<RowIssue>,
    /// Rows whose flags could not be parsed and fell back to the defaults
    pub defaulted: Vec<RowIssue>,
}

impl LoadedConfig {
    /// Whether every row was accepted as written
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.defaulted.is_empty()
    }
}

/// Parse a CSV flag; blank or missing means `default`.
///
/// Accepts `true/false`, `yes/no`, `1/0`, `t/f`, `y/n` in any case.
pub fn parse_bool(value: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(v) => v.to_lowercase(),
    };

    match value.as_str() {
        "true" | "yes" | "1" | "t" | "y" => Ok(true),
        "false" | "no" | "0" | "f" | "n" => Ok(false),
        _ => Err(ConfigError::InvalidBool(value)),
    }
}

/// `(no_extra, avoid_volumes, delete, ignore)` from columns 3 to 6
fn parse_flags(record: &csv::StringRecord) -> Result<(bool, bool, bool, bool), ConfigError> {
    Ok((
        parse_bool(record.get(2), DEFAULT_NO_EXTRA)?,
        parse_bool(record.get(3), DEFAULT_AVOID_VOLUMES)?,
        parse_bool(record.get(4), DEFAULT_DELETE)?,
        parse_bool(record.get(5), DEFAULT_IGNORE)?,
    ))
}

/// Read the configuration file at `path`
pub fn load_config_file(path: &Path, reporter: &dyn Reporter) -> Result<LoadedConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::MissingFile(path.display().to_string()));
    }

    reporter.info(&format!("Reading configuration from: {}", path.display()));
    let file = File::open(path).map_err(|e| ConfigError::Csv(e.into()))?;
    read_config(file, reporter)
}

/// Read configuration rows from any reader
pub fn read_config<R: Read>(reader: R, reporter: &dyn Reporter) -> Result<LoadedConfig, ConfigError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut loaded = LoadedConfig::default();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 1);
        let field = |i: usize| record.get(i).map(str::trim);

        let folder = field(0)
            .unwrap_or_default()
            .trim_start_matches('\u{feff}')
            .to_string();
        if folder.is_empty() {
            reporter.error(&format!("Invalid row {}: {:?}. Skipping.", line, record));
            loaded.rejected.push(RowIssue {
                line,
                folder,
                message: "missing folder name".to_string(),
            });
            continue;
        }

        let batch = match field(1) {
            None | Some("") => {
                reporter.info(&format!(
                    "No batch size specified for '{}'. Skipping.",
                    folder
                ));
                loaded.skipped.push(RowIssue {
                    line,
                    folder,
                    message: "no batch size".to_string(),
                });
                continue;
            }
            Some(raw) => match raw.parse::<BatchSpec>() {
                Ok(spec) => spec,
                Err(e) => {
                    reporter.error(&format!(
                        "Invalid batch configuration for '{}': {}",
                        folder, e
                    ));
                    loaded.rejected.push(RowIssue {
                        line,
                        folder,
                        message: e.to_string(),
                    });
                    continue;
                }
            },
        };

        let (no_extra, avoid_volumes, delete_originals, ignore) = match parse_flags(&record) {
            Ok(flags) => flags,
            Err(e) => {
                reporter.error(&format!(
                    "Invalid boolean value in row {}: {}. Using defaults.",
                    line, e
                ));
                loaded.defaulted.push(RowIssue {
                    line,
                    folder: folder.clone(),
                    message: e.to_string(),
                });
                (
                    DEFAULT_NO_EXTRA,
                    DEFAULT_AVOID_VOLUMES,
                    DEFAULT_DELETE,
                    DEFAULT_IGNORE,
                )
            }
        };

        loaded.series.push(
            SeriesConfig::new(folder, batch)
                .with_merge_leftovers(!no_extra)
                .with_avoid_volumes(avoid_volumes)
                .with_delete_originals(delete_originals)
                .with_ignore(ignore),
        );
    }

    Ok(loaded)
}
