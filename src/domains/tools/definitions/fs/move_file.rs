//! Move file tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, EntryKind};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the move file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MoveFileParams {
    /// Entry to move.
    pub source: String,

    /// New location.
    pub destination: String,

    /// Replace an existing destination of the same kind.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MoveFileResult {
    pub source: String,
    pub destination: String,
    pub overwritten: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Move file tool - renames files or directories.
pub struct MoveFileTool;

impl MoveFileTool {
    pub const NAME: &'static str = "move_file";

    pub const DESCRIPTION: &'static str = "Move or rename a file or directory. Both paths must be inside the allowed directories. Fails if the destination exists unless overwrite is set.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Read, Intent::Delete, Intent::Write],
        path_params: &["source", "destination"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(source = %params.source, destination = %params.destination))]
    pub fn execute(params: &MoveFileParams, ctx: &ToolContext<'_>) -> Result<MoveFileResult, ToolError> {
        info!("Move file tool called");

        ctx.authorize(&params.source, Intent::Read)?;
        let source = ctx.authorize(&params.source, Intent::Delete)?;
        let kind = fs::entry_kind(&source).map_err(ToolError::at(&params.source))?;

        // Directory names carry no extension policy.
        let destination = if kind == EntryKind::Directory {
            ctx.authorize_directory(&params.destination)?
        } else {
            ctx.authorize(&params.destination, Intent::Write)?
        };

        let outcome = fs::move_path(&source, &destination, params.overwrite)
            .map_err(ToolError::at(&params.destination))?;

        Ok(MoveFileResult {
            source: params.source.clone(),
            destination: params.destination.clone(),
            overwritten: outcome.overwritten,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: MoveFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<MoveFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<MoveFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
