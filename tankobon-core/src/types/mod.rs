//! Core types shared by the classifier, planner and builder

mod page;
mod series;
mod source;

pub use page::{is_image_entry, volume_file_name, PageEntry, IMAGE_EXTENSIONS};
pub use series::{total_size, BatchSpec, SeriesConfig};
pub use source::{Batch, FileKind, SourceFile};
