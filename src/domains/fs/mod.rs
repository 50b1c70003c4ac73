//! File operations.
//!
//! Every function here takes [`ResolvedPath`] values produced by the path
//! guard and checks that each one carries the intent the operation needs.
//! Writes go through [`write::atomic_write`], so a reader never observes a
//! partially written file.
//!
//! [`ResolvedPath`]: crate::core::security::ResolvedPath

pub mod delete;
pub mod dir;
pub mod edit;
pub mod error;
pub mod info;
pub mod read;
pub mod search;
pub mod transfer;
pub mod write;

use std::fs::{FileType, Metadata};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use delete::{DeleteOutcome, delete_path};
pub use dir::{DirEntryInfo, ListOptions, create_directory, list_directory};
pub use edit::{EditOutcome, LineEdit, apply_edits, edit_file};
pub use error::{FsError, FsResult};
pub use info::{FileInfo, entry_kind, file_info};
pub use read::{FileContent, LineRange, ReadOutcome, read_file};
pub use search::{MatchSource, SearchMatch, SearchQuery, search};
pub use transfer::{CopyOutcome, MoveOutcome, TreeCopyOutcome, copy_directory, copy_file, move_path};
pub use write::{WriteOutcome, atomic_write, write_file};

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// Convert a metadata timestamp to UTC, if the platform provides it.
pub(crate) fn timestamp(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// Size reported for an entry: files only.
pub(crate) fn file_size(metadata: &Metadata) -> Option<u64> {
    metadata.is_file().then(|| metadata.len())
}
