//! List allowed paths tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListAllowedPathsParams {}

/// Active sandbox policy.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListAllowedPathsResult {
    /// Canonical allowed roots.
    pub allowed_paths: Vec<String>,
    pub max_file_size: u64,
    /// Empty when every extension is allowed.
    pub allowed_extensions: Vec<String>,
    pub audit_log_enabled: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct ListAllowedPathsTool;

impl ListAllowedPathsTool {
    pub const NAME: &'static str = "list_allowed_paths";

    pub const DESCRIPTION: &'static str = "List the directories this server may access and the active limits (maximum file size, allowed extensions).";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[],
        path_params: &[],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all)]
    pub fn execute(
        _params: &ListAllowedPathsParams,
        ctx: &ToolContext<'_>,
    ) -> Result<ListAllowedPathsResult, ToolError> {
        info!("List allowed paths tool called");
        let policy = ctx.policy();

        Ok(ListAllowedPathsResult {
            allowed_paths: policy
                .allowed_roots()
                .iter()
                .map(|root| root.display().to_string())
                .collect(),
            max_file_size: policy.max_file_size(),
            allowed_extensions: policy.allowed_extensions().iter().cloned().collect(),
            audit_log_enabled: ctx.policy().audit_enabled(),
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: ListAllowedPathsParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ListAllowedPathsParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<ListAllowedPathsResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}
