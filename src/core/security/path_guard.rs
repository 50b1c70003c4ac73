//! Path authorization.
//!
//! Every caller-supplied path goes through [`authorize`] before any
//! filesystem call is made. The result is a [`ResolvedPath`]: a canonical
//! location inside one of the allowed roots, tagged with the intent it was
//! authorized for. File operations only accept `ResolvedPath`, so an
//! unchecked string can never reach the filesystem.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::policy::SecurityPolicy;
use crate::core::protocol::ErrorKind;

/// What the caller intends to do with a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Read,
    Write,
    Delete,
    List,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while authorizing a path.
///
/// Messages only ever echo the path string the caller supplied.
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Invalid path: {reason}")]
    InvalidPath { reason: String },

    #[error("Path '{path}' is outside the allowed directories")]
    PathNotAllowed { path: String },

    #[error("Extension '{extension}' is not allowed for '{path}'")]
    ExtensionNotAllowed { path: String, extension: String },

    #[error("File too large: {size} bytes exceeds the limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Path was authorized for {authorized} but used for {requested}")]
    IntentMismatch { authorized: Intent, requested: Intent },
}

impl PathSecurityError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            reason: reason.into(),
        }
    }

    pub fn not_allowed(raw: &str) -> Self {
        Self::PathNotAllowed {
            path: raw.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPath { .. } | Self::IntentMismatch { .. } => ErrorKind::InvalidPath,
            Self::PathNotAllowed { .. } => ErrorKind::PathNotAllowed,
            Self::ExtensionNotAllowed { .. } => ErrorKind::ExtensionNotAllowed,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
        }
    }
}

/// A path that passed authorization for one specific intent.
///
/// Not `Clone`: a resolved path is produced per request and consumed by
/// the operation it was authorized for.
#[derive(Debug)]
pub struct ResolvedPath {
    path: PathBuf,
    intent: Intent,
}

impl ResolvedPath {
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// The canonical location, for logging and result rendering.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Borrow the location for an operation that needs `intent`.
    pub fn require(&self, intent: Intent) -> Result<&Path, PathSecurityError> {
        if self.intent == intent {
            Ok(&self.path)
        } else {
            Err(PathSecurityError::IntentMismatch {
                authorized: self.intent,
                requested: intent,
            })
        }
    }
}

/// Authorize `raw` for `intent` against `policy`.
///
/// Write intents are also checked against the extension allowlist.
pub fn authorize(
    raw: &str,
    policy: &SecurityPolicy,
    intent: Intent,
) -> Result<ResolvedPath, PathSecurityError> {
    let path = resolve(raw, policy, intent)?;
    if intent == Intent::Write {
        check_extension(raw, &path, policy)?;
    }
    debug!(raw, resolved = %path.display(), %intent, "Path authorized");
    Ok(ResolvedPath { path, intent })
}

/// Authorize a file write of `declared_len` bytes.
pub fn authorize_write(
    raw: &str,
    policy: &SecurityPolicy,
    declared_len: u64,
) -> Result<ResolvedPath, PathSecurityError> {
    let resolved = authorize(raw, policy, Intent::Write)?;
    check_size(policy, declared_len)?;
    Ok(resolved)
}

/// Authorize directory creation: Write intent, no extension check.
pub fn authorize_directory(
    raw: &str,
    policy: &SecurityPolicy,
) -> Result<ResolvedPath, PathSecurityError> {
    let path = resolve(raw, policy, Intent::Write)?;
    Ok(ResolvedPath {
        path,
        intent: Intent::Write,
    })
}

/// Reject content larger than the configured maximum.
pub fn check_size(policy: &SecurityPolicy, size: u64) -> Result<(), PathSecurityError> {
    check_size_limit(size, policy.max_file_size())
}

/// Reject `size` when it exceeds `max`.
pub fn check_size_limit(size: u64, max: u64) -> Result<(), PathSecurityError> {
    if size > max {
        return Err(PathSecurityError::FileTooLarge { size, max });
    }
    Ok(())
}

/// Expand `~` and `$VAR` notation in a raw path.
pub fn expand_user_path(raw: &str) -> Result<PathBuf, PathSecurityError> {
    let expanded = shellexpand::full(raw).map_err(|e| {
        PathSecurityError::invalid(format!("cannot expand '{}': {}", e.var_name, e.cause))
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve(raw: &str, policy: &SecurityPolicy, intent: Intent) -> Result<PathBuf, PathSecurityError> {
    validate_raw(raw)?;

    let expanded = expand_user_path(raw)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map_err(|_| PathSecurityError::invalid("working directory is unavailable"))?
            .join(expanded)
    };
    let normalized = normalize_lexically(&absolute);

    let resolved = if intent == Intent::Delete {
        resolve_entry(&normalized, raw)?
    } else {
        resolve_real(&normalized, raw)?
    };

    if !policy.contains(&resolved) {
        debug!(raw, resolved = %resolved.display(), "Path outside allowed roots");
        return Err(PathSecurityError::not_allowed(raw));
    }

    // A root may be read or listed, never removed.
    if intent == Intent::Delete && policy.is_root(&resolved) {
        return Err(PathSecurityError::not_allowed(raw));
    }

    Ok(resolved)
}

fn validate_raw(raw: &str) -> Result<(), PathSecurityError> {
    if raw.trim().is_empty() {
        return Err(PathSecurityError::invalid("path is empty"));
    }
    if raw.contains('\0') {
        return Err(PathSecurityError::invalid("path contains a NUL byte"));
    }
    if raw.chars().any(char::is_control) {
        return Err(PathSecurityError::invalid("path contains control characters"));
    }
    Ok(())
}

/// Resolve the parent but keep the final component as written, so that a
/// symlink is addressed as itself rather than as its target.
fn resolve_entry(path: &Path, raw: &str) -> Result<PathBuf, PathSecurityError> {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => Ok(resolve_real(parent, raw)?.join(name)),
        _ => resolve_real(path, raw),
    }
}

/// Follow every symlink. Missing trailing components are appended to the
/// canonical form of the deepest existing ancestor.
fn resolve_real(path: &Path, raw: &str) -> Result<PathBuf, PathSecurityError> {
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            resolve_missing(path, raw)
        }
        Err(e) => {
            debug!(raw, error = %e, "Cannot canonicalize path");
            Err(PathSecurityError::invalid(format!("cannot resolve '{raw}'")))
        }
    }
}

fn resolve_missing(path: &Path, raw: &str) -> Result<PathBuf, PathSecurityError> {
    let mut suffix: Vec<OsString> = Vec::new();
    let mut current = path.to_path_buf();

    loop {
        if std::fs::symlink_metadata(&current).is_ok() {
            // The entry exists but could not be canonicalized: a dangling
            // symlink somewhere along the chain.
            let Ok(mut base) = current.canonicalize() else {
                debug!(raw, entry = %current.display(), "Dangling symlink in path");
                return Err(PathSecurityError::not_allowed(raw));
            };
            for name in suffix.iter().rev() {
                base.push(name);
            }
            return Ok(base);
        }

        let Some(name) = current.file_name() else {
            return Err(PathSecurityError::invalid(format!("cannot resolve '{raw}'")));
        };
        suffix.push(name.to_os_string());
        if !current.pop() {
            return Err(PathSecurityError::invalid(format!("cannot resolve '{raw}'")));
        }
    }
}

fn check_extension(raw: &str, path: &Path, policy: &SecurityPolicy) -> Result<(), PathSecurityError> {
    if policy.allowed_extensions().is_empty() {
        return Ok(());
    }
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if policy.allowed_extensions().contains(&extension) {
        Ok(())
    } else {
        Err(PathSecurityError::ExtensionNotAllowed {
            path: raw.to_string(),
            extension,
        })
    }
}
