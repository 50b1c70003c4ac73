//! Directory listing and creation.

use std::fs;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use super::error::{FsError, FsResult};
use super::{EntryKind, file_size, timestamp};
use crate::core::security::{Intent, ResolvedPath};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DirEntryInfo {
    /// Path relative to the listed directory, `/`-separated.
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Listing options.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    /// Descend into subdirectories, up to `max_depth` levels.
    pub recursive: bool,
    pub max_depth: usize,
    /// Only report entries of this kind.
    pub kind: Option<EntryKind>,
    /// Stop after this many entries.
    pub limit: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: 1,
            kind: None,
            limit: usize::MAX,
        }
    }
}

/// List the entries of a directory, sorted by name.
///
/// Symlinks are reported as entries and never followed. Returns the
/// entries and whether the listing was cut off at `options.limit`.
pub fn list_directory(target: &ResolvedPath, options: ListOptions) -> FsResult<(Vec<DirEntryInfo>, bool)> {
    let path = target.require(Intent::List)?;

    let metadata = fs::metadata(path).map_err(|e| FsError::from_io("stat directory", e))?;
    if !metadata.is_dir() {
        return Err(FsError::NotADirectory);
    }

    let depth = if options.recursive {
        options.max_depth.max(1)
    } else {
        1
    };

    let walker = WalkDir::new(path)
        .min_depth(1)
        .max_depth(depth)
        .follow_links(false)
        .sort_by_file_name();

    let mut entries = Vec::new();
    let mut truncated = false;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let kind = EntryKind::from_file_type(entry.file_type());
        if options.kind.is_some_and(|wanted| wanted != kind) {
            continue;
        }
        if entries.len() == options.limit {
            truncated = true;
            break;
        }

        let metadata = entry.metadata().ok();
        let name = entry
            .path()
            .strip_prefix(path)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(DirEntryInfo {
            name,
            kind,
            size: metadata.as_ref().and_then(file_size),
            modified: metadata.and_then(|m| timestamp(m.modified())),
        });
    }

    Ok((entries, truncated))
}

/// Create a directory and any missing parents.
///
/// Returns `false` when the directory already existed.
pub fn create_directory(target: &ResolvedPath) -> FsResult<bool> {
    let path = target.require(Intent::Write)?;

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => return Err(FsError::AlreadyExistsAsFile),
        Err(_) => {}
    }

    fs::create_dir_all(path).map_err(|e| match FsError::from_io("create directory", e) {
        FsError::NotADirectory | FsError::DestinationExists => FsError::AlreadyExistsAsFile,
        other => other,
    })?;
    Ok(true)
}
