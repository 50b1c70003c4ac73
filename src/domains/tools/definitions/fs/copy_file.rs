//! Copy file tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs;
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CopyFileParams {
    /// File to copy.
    pub source: String,

    /// Path of the copy.
    pub destination: String,

    /// Replace an existing destination file.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CopyFileResult {
    pub source: String,
    pub destination: String,
    pub bytes_copied: u64,
    pub overwritten: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct CopyFileTool;

impl CopyFileTool {
    pub const NAME: &'static str = "copy_file";

    pub const DESCRIPTION: &'static str = "Copy a single file to a new location inside the allowed directories. Directories cannot be copied. Fails if the destination exists unless overwrite is set.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Read, Intent::Write],
        path_params: &["source", "destination"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(source = %params.source, destination = %params.destination))]
    pub fn execute(params: &CopyFileParams, ctx: &ToolContext<'_>) -> Result<CopyFileResult, ToolError> {
        info!("Copy file tool called");

        let source = ctx.authorize(&params.source, Intent::Read)?;
        let destination = ctx.authorize(&params.destination, Intent::Write)?;

        let outcome = fs::copy_file(
            &source,
            &destination,
            params.overwrite,
            ctx.policy().max_file_size(),
        )
        .map_err(ToolError::at(&params.source))?;

        Ok(CopyFileResult {
            source: params.source.clone(),
            destination: params.destination.clone(),
            bytes_copied: outcome.bytes_copied,
            overwritten: outcome.overwritten,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: CopyFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CopyFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<CopyFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
