//! Tool-specific error types.

use thiserror::Error;

use crate::core::protocol::{ErrorKind, JsonRpcError};
use crate::core::security::PathSecurityError;
use crate::domains::fs::FsError;

/// Errors that can occur while dispatching a method.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No method with this name is registered.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The parameters did not match the method's schema.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The path guard refused a path.
    #[error(transparent)]
    Security(#[from] PathSecurityError),

    /// A file operation failed on the path the caller supplied.
    #[error("{source}: '{path}'")]
    Fs {
        path: String,
        #[source]
        source: FsError,
    },

    /// A handler failed in a way it did not anticipate.
    #[error("Internal error while handling the request")]
    Internal,
}

impl ToolError {
    /// Create a new "invalid params" error.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    /// Wrap file operation failures on `path`.
    ///
    /// Intended for `map_err`: `.map_err(ToolError::at(&params.path))`.
    pub fn at(path: &str) -> impl FnOnce(FsError) -> Self + '_ {
        move |source| match source {
            FsError::Security(e) => Self::Security(e),
            source => Self::Fs {
                path: path.to_string(),
                source,
            },
        }
    }

    /// Caller-visible classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MethodNotFound(_) => ErrorKind::MethodNotFound,
            Self::InvalidParams(_) => ErrorKind::InvalidParams,
            Self::Security(e) => e.kind(),
            Self::Fs { source, .. } => source.kind(),
            Self::Internal => ErrorKind::IoError,
        }
    }

    /// The JSON-RPC error object for this failure.
    pub fn to_rpc_error(&self) -> JsonRpcError {
        JsonRpcError::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_error_carries_caller_path() {
        let err = ToolError::at("notes/a.txt")(FsError::NotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Not found: 'notes/a.txt'");
    }

    #[test]
    fn test_security_errors_are_unwrapped() {
        let err = ToolError::at("x")(FsError::Security(PathSecurityError::FileTooLarge {
            size: 2,
            max: 1,
        }));
        assert!(matches!(err, ToolError::Security(_)));
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    }

    #[test]
    fn test_rpc_error_shape() {
        let rpc = ToolError::MethodNotFound("foo_bar".into()).to_rpc_error();
        assert_eq!(rpc.code, -32601);
        assert_eq!(rpc.kind(), Some("MethodNotFound"));

        let rpc = ToolError::Internal.to_rpc_error();
        assert_eq!(rpc.code, -32000);
        assert_eq!(rpc.kind(), Some("IOError"));
    }
}
