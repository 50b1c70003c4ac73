//! Entry metadata.

use std::fs::{self, Metadata};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use super::error::{FsError, FsResult};
use super::{EntryKind, timestamp};
use crate::core::security::{Intent, ResolvedPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct FileInfo {
    pub name: String,
    pub kind: EntryKind,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<DateTime<Utc>>,
    pub readonly: bool,
    /// `rwxr-xr-x` style on Unix; `readonly` or `readwrite` elsewhere.
    pub permissions: String,
}

/// Metadata of the entry at `target`.
pub fn file_info(target: &ResolvedPath) -> FsResult<FileInfo> {
    let path = target.require(Intent::Read)?;
    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat entry", e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    Ok(FileInfo {
        name,
        kind: EntryKind::from_file_type(metadata.file_type()),
        size: metadata.len(),
        created: timestamp(metadata.created()),
        modified: timestamp(metadata.modified()),
        accessed: timestamp(metadata.accessed()),
        readonly: metadata.permissions().readonly(),
        permissions: permission_string(&metadata),
    })
}

/// Kind of the entry itself, without following a final symlink.
pub fn entry_kind(target: &ResolvedPath) -> FsResult<EntryKind> {
    let metadata =
        fs::symlink_metadata(target.as_path()).map_err(|e| FsError::from_io("stat entry", e))?;
    Ok(EntryKind::from_file_type(metadata.file_type()))
}

#[cfg(unix)]
fn permission_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    let flags = ['r', 'w', 'x'];
    (0..9)
        .map(|bit| {
            if mode & (0o400 >> bit) != 0 {
                flags[bit % 3]
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(not(unix))]
fn permission_string(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "readonly".to_string()
    } else {
        "readwrite".to_string()
    }
}
