//! Pages collected from chapter archives

use std::path::Path;

/// Image extensions accepted as pages (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp"];

/// A single image pulled out of a source archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// Position of the originating archive within its batch
    pub source_index: usize,

    /// Entry name inside the originating archive
    pub name: String,

    pub data: Vec<u8>,
}

impl PageEntry {
    pub fn new(source_index: usize, name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            source_index,
            name: name.into(),
            data,
        }
    }

    /// Extension of the original entry, case preserved, without the dot
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }

    /// Name of this page once it sits at `index` (1-based) in a volume
    pub fn page_name(&self, index: usize) -> String {
        match self.extension() {
            Some(ext) => format!("page_{:03}.{}", index, ext),
            None => format!("page_{:03}", index),
        }
    }
}

/// Whether an archive entry is a page image
///
/// Directories, `ComicInfo.xml` and anything else without an image
/// extension are not pages.
pub fn is_image_entry(name: &str) -> bool {
    if name.ends_with('/') {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Output archive name for a volume: `"<series> V<NNN>.cbz"`
pub fn volume_file_name(series: &str, volume: u32) -> String {
    format!("{} V{:03}.cbz", series, volume)
}
