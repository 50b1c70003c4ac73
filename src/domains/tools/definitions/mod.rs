//! Method definitions.
//!
//! One file per method: params and result types, the `execute` logic, and
//! the [`MethodSpec`](super::registry::MethodSpec) that registers it.

pub mod common;
pub mod fs;

pub use common::Encoding;
pub use fs::{
    CopyDirectoryTool, CopyFileTool, CreateDirectoryTool, DeleteFileTool, EditFileTool,
    GetFileInfoTool, ListAllowedPathsTool, ListDirectoryTool, MoveFileTool, ReadFileTool,
    SearchFilesTool, WriteFileTool,
};
