//! Removing files, symlinks and directories.

use std::fs;

use super::EntryKind;
use super::error::{FsError, FsResult};
use crate::core::security::{Intent, ResolvedPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub kind: EntryKind,
}

/// Delete an entry. Non-empty directories need `recursive`.
///
/// A symlink is removed itself; its target is never touched.
pub fn delete_path(target: &ResolvedPath, recursive: bool) -> FsResult<DeleteOutcome> {
    let path = target.require(Intent::Delete)?;

    let metadata = fs::symlink_metadata(path).map_err(|e| FsError::from_io("stat entry", e))?;
    let kind = EntryKind::from_file_type(metadata.file_type());

    match kind {
        EntryKind::Directory if recursive => fs::remove_dir_all(path),
        EntryKind::Directory => fs::remove_dir(path),
        _ => fs::remove_file(path),
    }
    .map_err(|e| FsError::from_io("delete", e))?;

    Ok(DeleteOutcome { kind })
}
