//! Delete file tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::core::security::Intent;
use crate::domains::fs::{self, EntryKind};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the delete file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    /// File, symlink or directory to delete.
    pub path: String,

    /// Required to delete a non-empty directory with all its contents.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DeleteFileResult {
    pub path: String,
    /// Kind of the entry that was removed.
    pub kind: EntryKind,
    pub recursive: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Delete file tool - WARNING: deletion is permanent.
pub struct DeleteFileTool;

impl DeleteFileTool {
    pub const NAME: &'static str = "delete_file";

    pub const DESCRIPTION: &'static str = "Permanently delete a file, symbolic link or empty directory inside the allowed directories. Deleting a non-empty directory requires recursive: true. A symbolic link is removed itself, never its target.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Delete],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(path = %params.path, recursive = params.recursive))]
    pub fn execute(params: &DeleteFileParams, ctx: &ToolContext<'_>) -> Result<DeleteFileResult, ToolError> {
        info!("Delete file tool called");

        let target = ctx.authorize(&params.path, Intent::Delete)?;
        let outcome = fs::delete_path(&target, params.recursive).map_err(ToolError::at(&params.path))?;
        if outcome.kind == EntryKind::Directory && params.recursive {
            warn!("Removed directory tree {}", target.as_path().display());
        }

        Ok(DeleteFileResult {
            path: params.path.clone(),
            kind: outcome.kind,
            recursive: params.recursive,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: DeleteFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<DeleteFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<DeleteFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
