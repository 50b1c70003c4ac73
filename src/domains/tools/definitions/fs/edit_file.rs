//! Edit file tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, LineEdit};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// One line-range replacement.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EditParams {
    /// First line to replace, 1-based.
    pub start_line: usize,

    /// Last line to replace, inclusive. Use `start_line - 1` to insert
    /// before `start_line`.
    pub end_line: usize,

    /// Replacement text.
    pub new_text: String,

    /// Expected current text of the range; the edit is refused if it differs.
    #[serde(default)]
    pub old_text: Option<String>,
}

/// Parameters for the edit file tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EditFileParams {
    /// Path of the text file to edit.
    pub path: String,

    /// Edits in ascending, non-overlapping line order.
    pub edits: Vec<EditParams>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EditFileResult {
    pub path: String,
    pub edits_applied: usize,
    /// Size of the file after the edits, in bytes.
    pub new_size: u64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Edit file tool - line-based edits, all or nothing.
pub struct EditFileTool;

impl EditFileTool {
    pub const NAME: &'static str = "edit_file";

    pub const DESCRIPTION: &'static str = "Apply line-based edits to a text file. Each edit replaces an inclusive 1-based line range with new text. Edits must be ascending and must not overlap. If any edit does not apply, the file is left unchanged.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Write],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(path = %params.path, edits = params.edits.len()))]
    pub fn execute(params: &EditFileParams, ctx: &ToolContext<'_>) -> Result<EditFileResult, ToolError> {
        info!("Edit file tool called");
        if params.edits.is_empty() {
            return Err(ToolError::invalid_params("edits must not be empty"));
        }

        let edits: Vec<LineEdit> = params
            .edits
            .iter()
            .map(|edit| LineEdit {
                start_line: edit.start_line,
                end_line: edit.end_line,
                new_text: edit.new_text.clone(),
                old_text: edit.old_text.clone(),
            })
            .collect();

        let target = ctx.authorize(&params.path, Intent::Write)?;
        let outcome = fs::edit_file(&target, &edits, ctx.policy().max_file_size())
            .map_err(ToolError::at(&params.path))?;

        Ok(EditFileResult {
            path: params.path.clone(),
            edits_applied: outcome.edits_applied,
            new_size: outcome.new_size,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: EditFileParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<EditFileParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<EditFileResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
