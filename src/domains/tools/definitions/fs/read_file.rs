//! Read file tool definition.
//!
//! Returns the content of a file, whole or as a line window.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, FileContent, LineRange};
use crate::domains::tools::definitions::common::{
    Encoding, parse_params, to_result, validate_line_range,
};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the read file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    /// Path of the file to read.
    pub path: String,

    /// First line to return, 1-based. Defaults to the first line.
    #[serde(default)]
    pub start_line: Option<usize>,

    /// Last line to return, inclusive. Defaults to the last line.
    #[serde(default)]
    pub end_line: Option<usize>,
}

/// Content of the file.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadFileResult {
    pub path: String,
    pub content: String,
    /// `utf8` for text, `base64` for binary content.
    pub encoding: Encoding,
    /// Size of the whole file in bytes.
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_lines: Option<usize>,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Read file tool.
pub struct ReadFileTool;

impl ReadFileTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "read_file";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Read a file inside the allowed directories. Optionally restrict the output to a 1-based inclusive line range. Binary files are returned base64-encoded.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Read],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    /// Execute the tool logic.
    #[instrument(skip_all, fields(path = %params.path))]
    pub fn execute(params: &ReadFileParams, ctx: &ToolContext<'_>) -> Result<ReadFileResult, ToolError> {
        info!("Read file tool called");
        validate_line_range(params.start_line, params.end_line)?;

        let target = ctx.authorize(&params.path, Intent::Read)?;
        let range = (params.start_line.is_some() || params.end_line.is_some()).then(|| LineRange {
            start: params.start_line.unwrap_or(1),
            end: params.end_line,
        });

        let outcome = fs::read_file(&target, range, ctx.policy().max_file_size())
            .map_err(ToolError::at(&params.path))?;

        let (content, encoding, window) = match outcome.content {
            FileContent::Text(text) => {
                let window = range.zip(outcome.total_lines).map(|(range, total)| {
                    let end = range.end.unwrap_or(total).min(total);
                    (range.start, end)
                });
                (text, Encoding::Utf8, window)
            }
            FileContent::Binary(bytes) => (Encoding::encode_binary(&bytes), Encoding::Base64, None),
        };

        Ok(ReadFileResult {
            path: params.path.clone(),
            content,
            encoding,
            size: outcome.size,
            start_line: window.map(|(start, _)| start),
            end_line: window.map(|(_, end)| end),
            total_lines: outcome.total_lines,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: ReadFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ReadFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<ReadFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
