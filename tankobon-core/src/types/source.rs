//! Chapter archives found in a series folder

use serde::{Deserialize, Serialize};

/// What the classifier decided a file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Side story (`SP01`), moved to `Specials/`
    Special,
    /// Already a volume (`V003`), left alone
    ExistingVolume,
    /// Chapter to be batched
    Regular,
}

/// One existing archive in a series folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name, also the sort key
    pub name: String,
    pub kind: FileKind,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A contiguous run of regular files and the volume they become
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<'a> {
    pub volume: u32,
    pub files: &'a [SourceFile],
}

impl<'a> Batch<'a> {
    pub fn new(volume: u32, files: &'a [SourceFile]) -> Self {
        Self { volume, files }
    }
}
