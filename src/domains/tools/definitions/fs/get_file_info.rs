//! Get file info tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, FileInfo};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFileInfoParams {
    /// File or directory to inspect.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetFileInfoResult {
    pub path: String,
    #[serde(flatten)]
    pub info: FileInfo,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct GetFileInfoTool;

impl GetFileInfoTool {
    pub const NAME: &'static str = "get_file_info";

    pub const DESCRIPTION: &'static str = "Get metadata for a file or directory: kind, size, creation, modification and access times, and permissions.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Read],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(path = %params.path))]
    pub fn execute(params: &GetFileInfoParams, ctx: &ToolContext<'_>) -> Result<GetFileInfoResult, ToolError> {
        info!("Get file info tool called");

        let target = ctx.authorize(&params.path, Intent::Read)?;
        let info = fs::file_info(&target).map_err(ToolError::at(&params.path))?;

        Ok(GetFileInfoResult {
            path: params.path.clone(),
            info,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: GetFileInfoParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GetFileInfoParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<GetFileInfoResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
