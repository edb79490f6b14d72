//! Classification of a series folder into specials, existing volumes and chapters

use crate::error::ClassificationError;
use crate::report::Reporter;
use crate::types::{FileKind, SourceFile};
use regex::Regex;
use serde::Serialize;

/// Result of classifying one series folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub specials: Vec<SourceFile>,
    pub existing_volumes: Vec<SourceFile>,
    /// Chapters in batching order
    pub regular: Vec<SourceFile>,
    /// First volume number new volumes may use, `None` when an existing
    /// volume already holds the largest number
    pub start_volume: Option<u32>,
}

/// Filename-pattern classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    special: Regex,
    volume: Regex,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            special: Regex::new(r"(?i)SP(\d+)").expect("special pattern is valid"),
            volume: Regex::new(r"(?i)V(\d+)").expect("volume pattern is valid"),
        }
    }

    /// `SP` followed by exactly two digits, anywhere in the name
    pub fn is_special(&self, name: &str) -> bool {
        self.special
            .captures_iter(name)
            .any(|caps| caps.get(1).map(|d| d.as_str().len() == 2).unwrap_or(false))
    }

    /// `V` followed by one or more digits, anywhere in the name
    pub fn is_volume(&self, name: &str) -> bool {
        self.volume.is_match(name)
    }

    /// Number of the first `V<digits>` occurrence
    pub fn volume_number(&self, name: &str) -> Result<Option<u32>, ClassificationError> {
        let Some(digits) = self
            .volume
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|d| d.as_str())
        else {
            return Ok(None);
        };

        digits
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ClassificationError::UnparseableVolume {
                file: name.to_string(),
                digits: digits.to_string(),
            })
    }

    /// Partition `names` and compute the starting volume number.
    ///
    /// Listing order does not matter: every partition comes back sorted
    /// case-insensitively. Volume numbers that do not fit are reported and
    /// ignored.
    pub fn classify<I, S>(&self, names: I, avoid_volumes: bool, reporter: &dyn Reporter) -> Classification
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut specials = Vec::new();
        let mut existing_volumes = Vec::new();
        let mut regular = Vec::new();

        for name in names {
            let name = name.as_ref();
            if self.is_special(name) {
                specials.push(SourceFile::new(name, FileKind::Special));
            } else if avoid_volumes && self.is_volume(name) {
                existing_volumes.push(SourceFile::new(name, FileKind::ExistingVolume));
            } else {
                regular.push(SourceFile::new(name, FileKind::Regular));
            }
        }

        sort_files(&mut specials);
        sort_files(&mut existing_volumes);
        sort_files(&mut regular);

        let mut max_volume: Option<u32> = None;
        for file in &existing_volumes {
            match self.volume_number(&file.name) {
                Ok(Some(n)) => max_volume = Some(max_volume.map_or(n, |m| m.max(n))),
                Ok(None) => {}
                Err(e) => reporter.warn(&e.to_string()),
            }
        }

        let start_volume = match max_volume {
            Some(m) => m.checked_add(1),
            None => Some(1),
        };

        Classification {
            specials,
            existing_volumes,
            regular,
            start_volume,
        }
    }
}

/// Case-insensitive alphabetical order, raw name as tie-breaker
pub fn sort_files(files: &mut [SourceFile]) {
    files.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
}
