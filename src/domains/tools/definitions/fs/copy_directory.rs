//! Copy directory tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, FsError};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CopyDirectoryParams {
    /// Directory whose tree is copied.
    pub source: String,

    /// New directory to create. Must not exist yet.
    pub destination: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CopyDirectoryResult {
    pub source: String,
    pub destination: String,
    pub files_copied: usize,
    /// Includes the destination itself.
    pub directories_created: usize,
    pub bytes_copied: u64,
    /// Symbolic links and special files that were not copied.
    pub skipped: usize,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct CopyDirectoryTool;

impl CopyDirectoryTool {
    pub const NAME: &'static str = "copy_directory";

    pub const DESCRIPTION: &'static str = "Copy a directory and everything below it to a new location inside the allowed directories. The destination must not exist. Every file must satisfy the extension and size limits; symbolic links are not copied.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Read, Intent::Write],
        path_params: &["source", "destination"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(source = %params.source, destination = %params.destination))]
    pub fn execute(
        params: &CopyDirectoryParams,
        ctx: &ToolContext<'_>,
    ) -> Result<CopyDirectoryResult, ToolError> {
        info!("Copy directory tool called");

        let source = ctx.authorize(&params.source, Intent::Read)?;
        let destination = ctx.authorize_directory(&params.destination)?;

        let outcome =
            fs::copy_directory(&source, &destination, ctx.policy()).map_err(|e| match e {
                FsError::DestinationExists => ToolError::at(&params.destination)(e),
                e => ToolError::at(&params.source)(e),
            })?;

        Ok(CopyDirectoryResult {
            source: params.source.clone(),
            destination: params.destination.clone(),
            files_copied: outcome.files_copied,
            directories_created: outcome.directories_created,
            bytes_copied: outcome.bytes_copied,
            skipped: outcome.skipped,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: CopyDirectoryParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CopyDirectoryParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<CopyDirectoryResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
