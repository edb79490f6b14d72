//! In-memory library (for testing)

use super::{ArchiveEntry, ArchiveStore, LibraryResult, SeriesLibrary};
use crate::error::{ArchiveError, LibraryError};
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;

type Archives = BTreeMap<String, Vec<ArchiveEntry>>;

/// Series folders and their archives, held in memory.
///
/// Subfolders are stored as their own series keyed `"<series>/<folder>"`.
/// Individual archives can be marked unreadable or undeletable, and a series
/// can be made read-only, to exercise failure handling.
#[derive(Default)]
pub struct MemoryLibrary {
    series: RwLock<BTreeMap<String, Archives>>,
    unreadable: RwLock<HashSet<(String, String)>>,
    undeletable: RwLock<HashSet<(String, String)>>,
    read_only: RwLock<HashSet<String>>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series folder
    pub fn add_series(&self, series: &str) {
        self.series
            .write()
            .unwrap()
            .entry(series.to_string())
            .or_default();
    }

    /// Add an archive, creating the series if needed
    pub fn add_archive(&self, series: &str, name: &str, entries: Vec<ArchiveEntry>) {
        self.series
            .write()
            .unwrap()
            .entry(series.to_string())
            .or_default()
            .insert(name.to_string(), entries);
    }

    /// Make reads of this archive fail
    pub fn mark_unreadable(&self, series: &str, name: &str) {
        self.unreadable
            .write()
            .unwrap()
            .insert((series.to_string(), name.to_string()));
    }

    /// Make deletion of this archive fail
    pub fn mark_undeletable(&self, series: &str, name: &str) {
        self.undeletable
            .write()
            .unwrap()
            .insert((series.to_string(), name.to_string()));
    }

    /// Make every write into this series fail
    pub fn mark_read_only(&self, series: &str) {
        self.read_only.write().unwrap().insert(series.to_string());
    }

    /// Archive names in a series (or `"<series>/<folder>"`), sorted
    pub fn archive_names(&self, series: &str) -> Vec<String> {
        self.series
            .read()
            .unwrap()
            .get(series)
            .map(|archives| archives.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Entries of one archive, if present
    pub fn archive(&self, series: &str, name: &str) -> Option<Vec<ArchiveEntry>> {
        self.series
            .read()
            .unwrap()
            .get(series)
            .and_then(|archives| archives.get(name))
            .cloned()
    }
}

impl SeriesLibrary for MemoryLibrary {
    fn series_exists(&self, series: &str) -> LibraryResult<bool> {
        Ok(self.series.read().unwrap().contains_key(series))
    }

    fn list_archives(&self, series: &str) -> LibraryResult<Vec<String>> {
        self.series
            .read()
            .unwrap()
            .get(series)
            .map(|archives| archives.keys().cloned().collect())
            .ok_or_else(|| LibraryError::NotFound(series.to_string()))
    }

    fn move_to_subfolder(&self, series: &str, name: &str, folder: &str) -> LibraryResult<()> {
        let mut all = self.series.write().unwrap();
        let entries = all
            .get_mut(series)
            .and_then(|archives| archives.remove(name))
            .ok_or_else(|| LibraryError::Move {
                name: name.to_string(),
                folder: folder.to_string(),
                reason: "no such archive".to_string(),
            })?;

        all.entry(format!("{}/{}", series, folder))
            .or_default()
            .insert(name.to_string(), entries);
        Ok(())
    }

    fn delete_archive(&self, series: &str, name: &str) -> LibraryResult<()> {
        let delete_error = |reason: &str| LibraryError::Delete {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self
            .undeletable
            .read()
            .unwrap()
            .contains(&(series.to_string(), name.to_string()))
        {
            return Err(delete_error("permission denied"));
        }

        self.series
            .write()
            .unwrap()
            .get_mut(series)
            .and_then(|archives| archives.remove(name))
            .map(|_| ())
            .ok_or_else(|| delete_error("no such archive"))
    }
}

impl ArchiveStore for MemoryLibrary {
    fn read_entries(&self, series: &str, name: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let read_error = |reason: &str| ArchiveError::Read {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self
            .unreadable
            .read()
            .unwrap()
            .contains(&(series.to_string(), name.to_string()))
        {
            return Err(read_error("invalid zip archive"));
        }

        self.archive(series, name)
            .ok_or_else(|| read_error("no such archive"))
    }

    fn write_entries(
        &self,
        series: &str,
        name: &str,
        entries: Vec<ArchiveEntry>,
    ) -> Result<(), ArchiveError> {
        let write_error = |reason: &str| ArchiveError::Write {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self.read_only.read().unwrap().contains(series) {
            return Err(write_error("read-only series"));
        }

        let mut all = self.series.write().unwrap();
        let archives = all
            .get_mut(series)
            .ok_or_else(|| write_error("no such series"))?;
        if archives.contains_key(name) {
            return Err(write_error("target already exists"));
        }
        archives.insert(name.to_string(), entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_library() {
        let library = MemoryLibrary::new();
        library.add_archive("S", "b.cbz", vec![ArchiveEntry::new("1.png", vec![1])]);
        library.add_archive("S", "a.cbz", vec![]);

        assert!(library.series_exists("S").unwrap());
        assert_eq!(library.list_archives("S").unwrap(), vec!["a.cbz", "b.cbz"]);

        library.move_to_subfolder("S", "a.cbz", "Specials").unwrap();
        assert_eq!(library.archive_names("S/Specials"), vec!["a.cbz"]);
        assert_eq!(library.list_archives("S").unwrap(), vec!["b.cbz"]);

        library.delete_archive("S", "b.cbz").unwrap();
        assert!(library.list_archives("S").unwrap().is_empty());
        assert!(library.delete_archive("S", "b.cbz").is_err());
    }

    #[test]
    fn test_failure_injection() {
        let library = MemoryLibrary::new();
        library.add_archive("S", "a.cbz", vec![]);
        library.mark_unreadable("S", "a.cbz");
        library.mark_undeletable("S", "a.cbz");
        library.mark_read_only("S");

        assert!(matches!(
            library.read_entries("S", "a.cbz"),
            Err(ArchiveError::Read { .. })
        ));
        assert!(matches!(
            library.delete_archive("S", "a.cbz"),
            Err(LibraryError::Delete { .. })
        ));
        assert!(matches!(
            library.write_entries("S", "V001.cbz", vec![]),
            Err(ArchiveError::Write { .. })
        ));
    }
}
