//! Volume builder: merges a batch of chapter archives into one volume
//!
//! Pages are gathered source by source (each source's images sorted by
//! name), renumbered `page_001`, `page_002`, ... in that order and written as
//! a single archive. Originals are only deleted once the volume exists.

use crate::error::ArchiveError;
use crate::library::{ArchiveEntry, ArchiveStore, SeriesLibrary};
use crate::report::Reporter;
use crate::types::{is_image_entry, volume_file_name, Batch, PageEntry};
use serde::Serialize;

/// A volume that was written successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuiltVolume {
    pub volume: u32,
    pub name: String,
    pub pages: usize,
    /// Source archives merged into this volume, in order
    pub sources: Vec<String>,
    /// Sources removed after the write
    pub deleted: Vec<String>,
    /// Sources that could not be removed, with the reason
    pub deletion_failures: Vec<String>,
}

/// Builds volumes from batches of one series
pub struct VolumeBuilder<'a, L: ?Sized> {
    library: &'a L,
    reporter: &'a dyn Reporter,
}

impl<'a, L> VolumeBuilder<'a, L>
where
    L: ArchiveStore + SeriesLibrary + ?Sized,
{
    pub fn new(library: &'a L, reporter: &'a dyn Reporter) -> Self {
        Self { library, reporter }
    }

    /// Merge `batch` into `"<series> V<NNN>.cbz"`.
    ///
    /// Any unreadable source aborts the batch before anything is written.
    /// With `delete_originals`, sources are removed after a successful write;
    /// a failed removal is reported and recorded but does not fail the batch.
    pub fn build(
        &self,
        series: &str,
        batch: &Batch<'_>,
        delete_originals: bool,
    ) -> Result<BuiltVolume, ArchiveError> {
        let name = volume_file_name(series, batch.volume);
        let pages = self.collect_pages(series, batch)?;

        if pages.is_empty() {
            self.reporter.error(&format!(
                "No images found in batch {}. Skipping.",
                batch.volume
            ));
            return Err(ArchiveError::NoPages { name });
        }

        let page_count = pages.len();
        self.library
            .write_entries(series, &name, renumber_pages(pages))
            .map_err(|e| {
                self.reporter
                    .error(&format!("Failed to create volume {}: {}", batch.volume, e));
                e
            })?;
        self.reporter
            .info(&format!("Created: {} ({} pages)", name, page_count));

        let sources: Vec<String> = batch.files.iter().map(|f| f.name.clone()).collect();
        let mut deleted = Vec::new();
        let mut deletion_failures = Vec::new();

        if delete_originals {
            for source in &sources {
                match self.library.delete_archive(series, source) {
                    Ok(()) => {
                        self.reporter.info(&format!("Deleted: {}", source));
                        deleted.push(source.clone());
                    }
                    Err(e) => {
                        self.reporter.error(&e.to_string());
                        deletion_failures.push(e.to_string());
                    }
                }
            }
        }

        Ok(BuiltVolume {
            volume: batch.volume,
            name,
            pages: page_count,
            sources,
            deleted,
            deletion_failures,
        })
    }

    /// Read every source of the batch and keep its images, in page order
    fn collect_pages(&self, series: &str, batch: &Batch<'_>) -> Result<Vec<PageEntry>, ArchiveError> {
        let mut pages = Vec::new();

        for (index, source) in batch.files.iter().enumerate() {
            let entries = self
                .library
                .read_entries(series, &source.name)
                .map_err(|e| {
                    self.reporter
                        .error(&format!("Error processing {}: {}", source.name, e));
                    e
                })?;

            let mut images: Vec<PageEntry> = entries
                .into_iter()
                .filter(|entry| is_image_entry(&entry.name))
                .map(|entry| PageEntry::new(index, entry.name, entry.data))
                .collect();
            sort_pages(&mut images);

            self.reporter.info(&format!(
                "Extracted to memory: {} ({} images)",
                source.name,
                images.len()
            ));
            pages.extend(images);
        }

        Ok(pages)
    }
}

/// Order pages by source position, then case-insensitively by entry name
pub fn sort_pages(pages: &mut [PageEntry]) {
    pages.sort_by(|a, b| {
        a.source_index
            .cmp(&b.source_index)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Rename pages to `page_<NNN>.<ext>` from 1, keeping their order
pub fn renumber_pages(pages: Vec<PageEntry>) -> Vec<ArchiveEntry> {
    pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| ArchiveEntry::new(page.page_name(i + 1), page.data))
        .collect()
}
