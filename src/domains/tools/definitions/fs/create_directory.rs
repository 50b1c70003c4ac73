//! Create directory tool definition.

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
pub struct CreateDirectoryParams {
    /// Directory to create, parents included.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreateDirectoryResult {
    pub path: String,
    /// False when the directory already existed.
    pub created: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct CreateDirectoryTool;

impl CreateDirectoryTool {
    pub const NAME: &'static str = "create_directory";

    pub const DESCRIPTION: &'static str = "Create a directory and any missing parents inside the allowed directories. Succeeds without changes if the directory already exists.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::Write],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(path = %params.path))]
    pub fn execute(
        params: &CreateDirectoryParams,
        ctx: &ToolContext<'_>,
    ) -> Result<CreateDirectoryResult, ToolError> {
        info!("Create directory tool called");

        let target = ctx.authorize_directory(&params.path)?;
        let created = fs::create_directory(&target).map_err(ToolError::at(&params.path))?;

        Ok(CreateDirectoryResult {
            path: params.path.clone(),
            created,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: CreateDirectoryParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CreateDirectoryParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<CreateDirectoryResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
