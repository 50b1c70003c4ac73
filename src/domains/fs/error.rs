//! File operation error types.

use std::io;

use thiserror::Error;
use tracing::debug;

use crate::core::protocol::ErrorKind;
use crate::core::security::PathSecurityError;

/// Errors raised by file operations.
///
/// Variants carry no host paths; the dispatcher attaches the path the
/// caller supplied when it reports the failure.
#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Security(#[from] PathSecurityError),

    #[error("Not found")]
    NotFound,

    #[error("Is a directory")]
    IsADirectory,

    #[error("Not a directory")]
    NotADirectory,

    #[error("Directory not empty")]
    DirectoryNotEmpty,

    #[error("Already exists as a file")]
    AlreadyExistsAsFile,

    #[error("Destination already exists")]
    DestinationExists,

    #[error("Conflicting edit: {0}")]
    ConflictingEdit(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FsError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConflictingEdit(msg.into())
    }

    /// Map an OS error from `operation` to a caller-visible kind.
    pub fn from_io(operation: &str, err: io::Error) -> Self {
        debug!(operation, error = %err, "Filesystem call failed");
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::IsADirectory => Self::IsADirectory,
            io::ErrorKind::NotADirectory => Self::NotADirectory,
            io::ErrorKind::DirectoryNotEmpty => Self::DirectoryNotEmpty,
            io::ErrorKind::AlreadyExists => Self::DestinationExists,
            kind => Self::Io(format!("{operation} failed: {kind}")),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Security(e) => e.kind(),
            Self::NotFound => ErrorKind::NotFound,
            Self::IsADirectory => ErrorKind::IsADirectory,
            Self::NotADirectory => ErrorKind::NotADirectory,
            Self::DirectoryNotEmpty => ErrorKind::DirectoryNotEmpty,
            Self::AlreadyExistsAsFile => ErrorKind::AlreadyExistsAsFile,
            Self::DestinationExists => ErrorKind::DestinationExists,
            Self::ConflictingEdit(_) => ErrorKind::ConflictingEdit,
            Self::Io(_) => ErrorKind::IoError,
        }
    }
}

/// Result alias for file operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kinds_are_mapped() {
        let err = FsError::from_io("read", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = FsError::from_io("read", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(err.kind(), ErrorKind::IoError);
        assert!(err.to_string().starts_with("I/O error: read failed"));
    }

    #[test]
    fn test_security_kind_passes_through() {
        let err = FsError::from(PathSecurityError::FileTooLarge { size: 2, max: 1 });
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    }
}
