//! Access to the comic library on disk
//!
//! Two narrow capabilities are used by the core: [`SeriesLibrary`] lists,
//! moves and deletes archives inside a series folder, and [`ArchiveStore`]
//! reads and writes the entries of a single archive. [`LocalLibrary`]
//! implements both over a directory of CBZ (zip) files.

mod memory;

pub use memory::MemoryLibrary;

use crate::error::{ArchiveError, LibraryError};
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};

/// Result type for library operations
pub type LibraryResult<T> = std::result::Result<T, LibraryError>;

/// Subfolder that specials are moved into
pub const SPECIALS_FOLDER: &str = "Specials";

/// Largest preallocation trusted from an entry's declared size
const ENTRY_SIZE_HINT_LIMIT: u64 = 64 * 1024 * 1024;

/// One named file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Listing and file management inside series folders
pub trait SeriesLibrary {
    /// Whether the series folder exists
    fn series_exists(&self, series: &str) -> LibraryResult<bool>;

    /// Names of the `.cbz` archives directly inside the series folder
    fn list_archives(&self, series: &str) -> LibraryResult<Vec<String>>;

    /// Move an archive into a subfolder of its series, creating it if needed
    fn move_to_subfolder(&self, series: &str, name: &str, folder: &str) -> LibraryResult<()>;

    /// Delete an archive
    fn delete_archive(&self, series: &str, name: &str) -> LibraryResult<()>;
}

/// Whole-archive reads and writes
pub trait ArchiveStore {
    /// Every file entry of an archive, in archive order
    fn read_entries(&self, series: &str, name: &str) -> Result<Vec<ArchiveEntry>, ArchiveError>;

    /// Create a new archive holding `entries` in the given order.
    ///
    /// Either the archive is fully written or nothing is left behind.
    fn write_entries(
        &self,
        series: &str,
        name: &str,
        entries: Vec<ArchiveEntry>,
    ) -> Result<(), ArchiveError>;
}

/// Local filesystem library of CBZ archives
pub struct LocalLibrary {
    root: PathBuf,
}

impl LocalLibrary {
    /// Create a library rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a path below the root, rejecting anything that escapes it
    fn full_path(&self, parts: &[&str]) -> LibraryResult<PathBuf> {
        let mut normalized = PathBuf::new();
        for part in parts {
            for component in Path::new(part).components() {
                match component {
                    Component::Normal(c) => normalized.push(c),
                    Component::CurDir => {}
                    Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                        return Err(LibraryError::InvalidPath(parts.join("/")));
                    }
                }
            }
        }

        Ok(self.root.join(normalized))
    }

    fn archive_path(&self, series: &str, name: &str) -> Result<PathBuf, ArchiveError> {
        self.full_path(&[series, name])
            .map_err(|e| ArchiveError::Read {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

fn is_cbz(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("cbz"))
        .unwrap_or(false)
}

impl SeriesLibrary for LocalLibrary {
    fn series_exists(&self, series: &str) -> LibraryResult<bool> {
        Ok(self.full_path(&[series])?.is_dir())
    }

    fn list_archives(&self, series: &str) -> LibraryResult<Vec<String>> {
        let dir = self.full_path(&[series])?;
        let read_dir = fs::read_dir(&dir).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LibraryError::NotFound(series.to_string()),
            _ => LibraryError::Io(e),
        })?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_cbz(&path) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }
        names.sort();
        Ok(names)
    }

    fn move_to_subfolder(&self, series: &str, name: &str, folder: &str) -> LibraryResult<()> {
        let source = self.full_path(&[series, name])?;
        let target_dir = self.full_path(&[series, folder])?;
        let move_error = |e: std::io::Error| LibraryError::Move {
            name: name.to_string(),
            folder: folder.to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(&target_dir).map_err(move_error)?;
        fs::rename(&source, target_dir.join(name)).map_err(move_error)
    }

    fn delete_archive(&self, series: &str, name: &str) -> LibraryResult<()> {
        let path = self.full_path(&[series, name])?;
        fs::remove_file(path).map_err(|e| LibraryError::Delete {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

impl ArchiveStore for LocalLibrary {
    fn read_entries(&self, series: &str, name: &str) -> Result<Vec<ArchiveEntry>, ArchiveError> {
        let read_error = |reason: String| ArchiveError::Read {
            name: name.to_string(),
            reason,
        };

        let path = self.archive_path(series, name)?;
        let file = File::open(&path).map_err(|e| read_error(e.to_string()))?;
        let mut archive =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| read_error(e.to_string()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| read_error(e.to_string()))?;
            if file.is_dir() {
                continue;
            }

            let mut data = Vec::with_capacity(file.size().min(ENTRY_SIZE_HINT_LIMIT) as usize);
            file.read_to_end(&mut data)
                .map_err(|e| read_error(format!("{}: {}", file.name(), e)))?;
            entries.push(ArchiveEntry::new(file.name(), data));
        }

        Ok(entries)
    }

    fn write_entries(
        &self,
        series: &str,
        name: &str,
        entries: Vec<ArchiveEntry>,
    ) -> Result<(), ArchiveError> {
        let write_error = |reason: String| ArchiveError::Write {
            name: name.to_string(),
            reason,
        };

        let path = self
            .full_path(&[series, name])
            .map_err(|e| write_error(e.to_string()))?;
        if path.exists() {
            return Err(write_error("target already exists".to_string()));
        }

        // Build the whole zip in memory first
        let mut output = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut output));
            let options = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);

            for entry in &entries {
                writer
                    .start_file(entry.name.as_str(), options)
                    .map_err(|e| write_error(e.to_string()))?;
                writer
                    .write_all(&entry.data)
                    .map_err(|e| write_error(e.to_string()))?;
            }

            writer.finish().map_err(|e| write_error(e.to_string()))?;
        }

        // Write to a temp file then rename to avoid partial archives
        let temp_path = path.with_extension("cbz.part");
        if let Err(e) = fs::write(&temp_path, &output) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(e.to_string()));
        }
        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_error(e.to_string()));
        }

        Ok(())
    }
}
