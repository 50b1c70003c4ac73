//! Moving and copying entries.

use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::EntryKind;
use super::error::{FsError, FsResult};
use super::write::atomic_write;
use crate::core::security::{
    Intent, PathSecurityError, ResolvedPath, SecurityPolicy, authorize_write, check_size_limit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub kind: EntryKind,
    pub overwritten: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub bytes_copied: u64,
    pub overwritten: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCopyOutcome {
    pub files_copied: usize,
    pub directories_created: usize,
    pub bytes_copied: u64,
    /// Symbolic links and special files left out of the copy.
    pub skipped: usize,
}

enum TreeItem {
    Directory(PathBuf),
    File { from: PathBuf, to: ResolvedPath },
}

/// Rename `source` to `destination`.
///
/// `source` must be authorized for Delete and `destination` for Write. An
/// existing destination is only replaced when `overwrite` is set.
pub fn move_path(source: &ResolvedPath, destination: &ResolvedPath, overwrite: bool) -> FsResult<MoveOutcome> {
    let from = source.require(Intent::Delete)?;
    let to = destination.require(Intent::Write)?;

    let source_meta = fs::symlink_metadata(from).map_err(|e| FsError::from_io("stat source", e))?;
    let kind = EntryKind::from_file_type(source_meta.file_type());

    let overwritten = match fs::symlink_metadata(to) {
        Ok(_) if !overwrite => return Err(FsError::DestinationExists),
        Ok(dest_meta) => {
            if dest_meta.is_dir() && !source_meta.is_dir() {
                return Err(FsError::IsADirectory);
            }
            if !dest_meta.is_dir() && source_meta.is_dir() {
                return Err(FsError::NotADirectory);
            }
            true
        }
        Err(_) => false,
    };

    match fs::rename(from, to) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices && source_meta.is_file() => {
            debug!("Rename crosses devices, copying instead");
            let bytes = fs::read(from).map_err(|e| FsError::from_io("read source", e))?;
            atomic_write(to, &bytes, u64::MAX)?;
            fs::remove_file(from).map_err(|e| FsError::from_io("remove source", e))?;
        }
        Err(e) => return Err(FsError::from_io("rename", e)),
    }

    Ok(MoveOutcome { kind, overwritten })
}

/// Copy a single file. `source` needs Read, `destination` needs Write.
pub fn copy_file(
    source: &ResolvedPath,
    destination: &ResolvedPath,
    overwrite: bool,
    max_size: u64,
) -> FsResult<CopyOutcome> {
    let from = source.require(Intent::Read)?;
    let to = destination.require(Intent::Write)?;

    let source_meta = fs::metadata(from).map_err(|e| FsError::from_io("stat source", e))?;
    if source_meta.is_dir() {
        return Err(FsError::IsADirectory);
    }
    check_size_limit(source_meta.len(), max_size)?;

    let overwritten = match fs::symlink_metadata(to) {
        Ok(_) if !overwrite => return Err(FsError::DestinationExists),
        Ok(dest_meta) if dest_meta.is_dir() => return Err(FsError::IsADirectory),
        Ok(_) => true,
        Err(_) => false,
    };

    let bytes = fs::read(from).map_err(|e| FsError::from_io("read source", e))?;
    let bytes_copied = atomic_write(to, &bytes, max_size)?;
    Ok(CopyOutcome {
        bytes_copied,
        overwritten,
    })
}

/// Copy the tree under `source` into `destination`, which must not exist.
///
/// Every file is authorized for writing at its new location (extension and
/// size policy) before anything is created. Symbolic links are skipped,
/// never followed. If copying fails part way, the partial tree is removed.
pub fn copy_directory(
    source: &ResolvedPath,
    destination: &ResolvedPath,
    policy: &SecurityPolicy,
) -> FsResult<TreeCopyOutcome> {
    let from = source.require(Intent::Read)?;
    let to = destination.require(Intent::Write)?;

    let source_meta = fs::metadata(from).map_err(|e| FsError::from_io("stat source", e))?;
    if !source_meta.is_dir() {
        return Err(FsError::NotADirectory);
    }
    if fs::symlink_metadata(to).is_ok() {
        return Err(FsError::DestinationExists);
    }
    if to.starts_with(from) {
        return Err(PathSecurityError::invalid("destination lies inside the source directory").into());
    }

    let mut plan = Vec::new();
    let mut outcome = TreeCopyOutcome::default();
    let walker = WalkDir::new(from)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let err = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("directory walk failed"));
            FsError::from_io("walk source", err)
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| FsError::Io("walk source failed: entry outside source".to_string()))?;
        let target = to.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            plan.push(TreeItem::Directory(target));
        } else if file_type.is_file() {
            let len = entry
                .metadata()
                .map_err(|_| FsError::Io("stat source entry failed".to_string()))?
                .len();
            let resolved = authorize_write(&target.to_string_lossy(), policy, len)?;
            plan.push(TreeItem::File {
                from: entry.path().to_path_buf(),
                to: resolved,
            });
        } else {
            debug!(entry = %entry.path().display(), "Skipping non-regular entry");
            outcome.skipped += 1;
        }
    }

    fs::create_dir(to).map_err(|e| FsError::from_io("create destination", e))?;
    outcome.directories_created += 1;

    for item in &plan {
        if let Err(e) = copy_item(item, policy.max_file_size(), &mut outcome) {
            if let Err(cleanup) = fs::remove_dir_all(to) {
                warn!("Failed to remove partial copy: {}", cleanup);
            }
            return Err(e);
        }
    }

    Ok(outcome)
}

fn copy_item(item: &TreeItem, max_size: u64, outcome: &mut TreeCopyOutcome) -> FsResult<()> {
    match item {
        TreeItem::Directory(path) => {
            fs::create_dir(path).map_err(|e| FsError::from_io("create directory", e))?;
            outcome.directories_created += 1;
        }
        TreeItem::File { from, to } => {
            let bytes = fs::read(from).map_err(|e| FsError::from_io("read source", e))?;
            outcome.bytes_copied += atomic_write(to.require(Intent::Write)?, &bytes, max_size)?;
            outcome.files_copied += 1;
        }
    }
    Ok(())
}
