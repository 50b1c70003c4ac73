//! Write file tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs;
use crate::domains::tools::definitions::common::{Encoding, parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the write file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// Path of the file to create or replace.
    pub path: String,

    /// New content of the file.
    pub content: String,

    /// How `content` is encoded: `utf8` (default) or `base64`.
    #[serde(default)]
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WriteFileResult {
    pub path: String,
    pub bytes_written: u64,
    /// True when the file did not exist before.
    pub created: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Write file tool - atomic whole-file replacement.
pub struct WriteFileTool;

impl WriteFileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "write_file";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Create or overwrite a file inside the allowed directories. Missing parent directories are created. The write is atomic: readers see the old content or the new content, never a mix.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Write],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    /// Execute the tool logic.
    #[instrument(skip_all, fields(path = %params.path))]
    pub fn execute(params: &WriteFileParams, ctx: &ToolContext<'_>) -> Result<WriteFileResult, ToolError> {
        let bytes = params.encoding.decode(&params.content)?;
        info!("Write file tool called ({} bytes)", bytes.len());

        let target = ctx.authorize_write(&params.path, bytes.len() as u64)?;
        let outcome = fs::write_file(&target, &bytes, ctx.policy().max_file_size())
            .map_err(ToolError::at(&params.path))?;

        Ok(WriteFileResult {
            path: params.path.clone(),
            bytes_written: outcome.bytes_written,
            created: outcome.created,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: WriteFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<WriteFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<WriteFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::ErrorKind;
    use crate::core::security::SecurityPolicy;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn params(path: &std::path::Path, content: &str) -> WriteFileParams {
        WriteFileParams {
            path: path.to_string_lossy().into(),
            content: content.to_string(),
            encoding: Encoding::Utf8,
        }
    }

    #[test]
    fn test_write_and_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 10, Vec::<String>::new())
                .unwrap();
        let ctx = ToolContext::new(&policy);
        let file = temp_dir.path().join("nested/a.txt");

        let result = WriteFileTool::execute(&params(&file, "hello"), &ctx).unwrap();
        assert!(result.created);
        assert_eq!(result.bytes_written, 5);

        let result = WriteFileTool::execute(&params(&file, "bye"), &ctx).unwrap();
        assert!(!result.created);
        assert_eq!(stdfs::read_to_string(&file).unwrap(), "bye");
    }

    #[test]
    fn test_too_large_leaves_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 10, Vec::<String>::new())
                .unwrap();
        let ctx = ToolContext::new(&policy);
        let file = temp_dir.path().join("a.txt");

        let err = WriteFileTool::execute(&params(&file, "01234567890"), &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
        assert!(!file.exists());
    }

    #[test]
    fn test_extension_checked_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 10, ["txt"]).unwrap();
        let ctx = ToolContext::new(&policy);
        let file = temp_dir.path().join("run.exe");

        let err = WriteFileTool::execute(&params(&file, "MZ"), &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtensionNotAllowed);
        assert!(!file.exists());
    }

    #[test]
    fn test_base64_content() {
        let temp_dir = TempDir::new().unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 10, Vec::<String>::new())
                .unwrap();
        let ctx = ToolContext::new(&policy);
        let file = temp_dir.path().join("b.bin");

        let mut p = params(&file, "/wA=");
        p.encoding = Encoding::Base64;
        let result = WriteFileTool::execute(&p, &ctx).unwrap();
        assert_eq!(result.bytes_written, 2);
        assert_eq!(stdfs::read(&file).unwrap(), vec![0xff, 0x00]);
    }
}
