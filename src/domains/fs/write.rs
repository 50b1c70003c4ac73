//! Atomic file writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::{FsError, FsResult};
use crate::core::security::{Intent, PathSecurityError, ResolvedPath};

/// Result of a whole-file write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub bytes_written: u64,
    /// True when the file did not exist before.
    pub created: bool,
}

/// Replace the content of a file, creating missing parent directories.
pub fn write_file(target: &ResolvedPath, bytes: &[u8], max_size: u64) -> FsResult<WriteOutcome> {
    let path = target.require(Intent::Write)?;

    let created = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => return Err(FsError::IsADirectory),
        Ok(_) => false,
        Err(_) => true,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| FsError::from_io("create parent directories", e))?;
    }

    let bytes_written = atomic_write(path, bytes, max_size)?;
    Ok(WriteOutcome {
        bytes_written,
        created,
    })
}

/// Write `bytes` to a temporary sibling of `path`, then rename it over
/// `path`. The target is untouched unless the rename happens.
///
/// The size of the temporary file is re-checked against `max_size` before
/// the rename; on overflow the temporary file is removed.
pub fn atomic_write(path: &Path, bytes: &[u8], max_size: u64) -> FsResult<u64> {
    let parent = path
        .parent()
        .ok_or_else(|| FsError::Io("target has no parent directory".to_string()))?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::from_io("create temporary file", e))?;
    temp.write_all(bytes)
        .map_err(|e| FsError::from_io("write temporary file", e))?;
    temp.flush()
        .map_err(|e| FsError::from_io("flush temporary file", e))?;

    let written = temp
        .as_file()
        .metadata()
        .map_err(|e| FsError::from_io("stat temporary file", e))?
        .len();
    if written > max_size {
        // Dropping `temp` deletes it.
        return Err(PathSecurityError::FileTooLarge {
            size: written,
            max: max_size,
        }
        .into());
    }

    temp.as_file()
        .sync_all()
        .map_err(|e| FsError::from_io("sync temporary file", e))?;

    // Keep the permissions of the file being replaced.
    if let Ok(existing) = fs::metadata(path) {
        let _ = fs::set_permissions(temp.path(), existing.permissions());
    }

    temp.persist(path)
        .map_err(|e| FsError::from_io("replace target file", e.error))?;
    debug!(path = %path.display(), bytes = written, "Atomic write committed");
    Ok(written)
}
