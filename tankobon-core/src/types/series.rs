//! Per-series configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a series' regular files are grouped into volumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "sizes", rename_all = "snake_case")]
pub enum BatchSpec {
    /// The same number of chapters per volume, repeated
    Repeating(usize),

    /// Explicit chapter counts, consumed in order
    Explicit(Vec<usize>),
}

impl FromStr for BatchSpec {
    type Err = ConfigError;

    /// Parse `"5"` (repeating) or `"3,4,5,3"` (explicit)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.contains(',') {
            let sizes = s
                .split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| ConfigError::InvalidBatchSizes(s.to_string()))?;
            if sizes.contains(&0) {
                return Err(ConfigError::ZeroBatchSize);
            }
            total_size(&sizes)?;
            Ok(BatchSpec::Explicit(sizes))
        } else {
            let size = s
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidBatchSize(s.to_string()))?;
            if size == 0 {
                return Err(ConfigError::ZeroBatchSize);
            }
            Ok(BatchSpec::Repeating(size))
        }
    }
}

/// Sum of explicit batch sizes, failing instead of overflowing
pub fn total_size(sizes: &[usize]) -> Result<usize, ConfigError> {
    sizes
        .iter()
        .try_fold(0usize, |acc, &s| acc.checked_add(s))
        .ok_or(ConfigError::BatchSizesOverflow)
}

impl fmt::Display for BatchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSpec::Repeating(size) => write!(f, "{}", size),
            BatchSpec::Explicit(sizes) => {
                let parts: Vec<String> = sizes.iter().map(|s| s.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// One row of the library configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Series folder name, relative to the library root
    pub folder: String,

    /// Chapters per volume
    pub batch: BatchSpec,

    /// Fold leftover chapters into volumes instead of leaving them alone
    pub merge_leftovers: bool,

    /// Detect existing `V<n>` files, skip them and continue their numbering
    pub avoid_volumes: bool,

    /// Delete source chapters once their volume is written
    pub delete_originals: bool,

    /// Skip this series entirely
    pub ignore: bool,
}

impl SeriesConfig {
    /// Create a config with the CSV defaults
    /// (no-extra, avoid-volumes and delete enabled, not ignored)
    pub fn new(folder: impl Into<String>, batch: BatchSpec) -> Self {
        Self {
            folder: folder.into(),
            batch,
            merge_leftovers: false,
            avoid_volumes: true,
            delete_originals: true,
            ignore: false,
        }
    }

    pub fn with_merge_leftovers(mut self, merge: bool) -> Self {
        self.merge_leftovers = merge;
        self
    }

    pub fn with_avoid_volumes(mut self, avoid: bool) -> Self {
        self.avoid_volumes = avoid;
        self
    }

    pub fn with_delete_originals(mut self, delete: bool) -> Self {
        self.delete_originals = delete;
        self
    }

    pub fn with_ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeating() {
        assert_eq!("5".parse::<BatchSpec>().unwrap(), BatchSpec::Repeating(5));
        assert_eq!(" 12 ".parse::<BatchSpec>().unwrap(), BatchSpec::Repeating(12));
    }

    #[test]
    fn test_parse_explicit() {
        assert_eq!(
            "3, 4,5 ,3".parse::<BatchSpec>().unwrap(),
            BatchSpec::Explicit(vec![3, 4, 5, 3])
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "five".parse::<BatchSpec>(),
            Err(ConfigError::InvalidBatchSize(_))
        ));
        assert!(matches!(
            "3,x".parse::<BatchSpec>(),
            Err(ConfigError::InvalidBatchSizes(_))
        ));
        assert!(matches!(
            "3,,4".parse::<BatchSpec>(),
            Err(ConfigError::InvalidBatchSizes(_))
        ));
        assert!(matches!(
            "-2".parse::<BatchSpec>(),
            Err(ConfigError::InvalidBatchSize(_))
        ));
    }

    #[test]
    fn test_parse_rejects_zero() {
        assert!(matches!("0".parse::<BatchSpec>(), Err(ConfigError::ZeroBatchSize)));
        assert!(matches!("2,0".parse::<BatchSpec>(), Err(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn test_parse_rejects_sizes_that_overflow() {
        assert!(matches!(
            "18446744073709551615,1".parse::<BatchSpec>(),
            Err(ConfigError::BatchSizesOverflow)
        ));
        assert_eq!(total_size(&[3, 4, 5, 3]).unwrap(), 15);
    }

    #[test]
    fn test_display_matches_input_form() {
        assert_eq!(BatchSpec::Repeating(5).to_string(), "5");
        assert_eq!(BatchSpec::Explicit(vec![3, 4]).to_string(), "3,4");
    }

    #[test]
    fn test_defaults() {
        let config = SeriesConfig::new("Berserk", BatchSpec::Repeating(10));
        assert!(!config.merge_leftovers);
        assert!(config.avoid_volumes);
        assert!(config.delete_originals);
        assert!(!config.ignore);
    }
}
