//! List directory tool definition.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, DirEntryInfo, EntryKind, ListOptions};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Entry filter for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    File,
    Directory,
}

impl From<KindFilter> for EntryKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::File => EntryKind::File,
            KindFilter::Directory => EntryKind::Directory,
        }
    }
}

/// Parameters for the list directory tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListDirectoryParams {
    /// Directory to list.
    pub path: String,

    /// Only return files or only directories.
    #[serde(default)]
    pub kind: Option<KindFilter>,

    /// Include subdirectory contents, up to the configured depth.
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListDirectoryResult {
    pub path: String,
    pub entries: Vec<DirEntryInfo>,
    /// True when the listing hit the configured result cap.
    pub truncated: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct ListDirectoryTool;

impl ListDirectoryTool {
    pub const NAME: &'static str = "list_directory";

    pub const DESCRIPTION: &'static str = "List the entries of a directory, sorted by name, with kind, size and modification time. Optionally filter by kind or list recursively. Symbolic links are reported, never followed.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::List],
        path_params: &["path"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(path = %params.path, recursive = params.recursive))]
    pub fn execute(
        params: &ListDirectoryParams,
        ctx: &ToolContext<'_>,
    ) -> Result<ListDirectoryResult, ToolError> {
        info!("List directory tool called");

        let target = ctx.authorize(&params.path, Intent::List)?;
        let options = ListOptions {
            recursive: params.recursive,
            max_depth: ctx.policy().search_max_depth(),
            kind: params.kind.map(EntryKind::from),
            limit: ctx.policy().search_max_results(),
        };

        let (entries, truncated) =
            fs::list_directory(&target, options).map_err(ToolError::at(&params.path))?;
        info!("Listed {} entries", entries.len());

        Ok(ListDirectoryResult {
            path: params.path.clone(),
            entries,
            truncated,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: ListDirectoryParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ListDirectoryParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<ListDirectoryResult>().into()),
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
    use serde_json::json;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SecurityPolicy) {
        let temp_dir = TempDir::new().unwrap();
        stdfs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        stdfs::create_dir(temp_dir.path().join("sub")).unwrap();
        stdfs::write(temp_dir.path().join("sub/b.txt"), "bb").unwrap();
        let policy =
            SecurityPolicy::new(vec![temp_dir.path().to_path_buf()], 64, Vec::<String>::new())
                .unwrap();
        (temp_dir, policy)
    }

    #[test]
    fn test_list_flat() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);
        let params: ListDirectoryParams =
            parse_params(json!({"path": temp_dir.path().to_string_lossy()})).unwrap();

        let result = ListDirectoryTool::execute(&params, &ctx).unwrap();
        let names: Vec<&str> = result.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "sub"]);
        assert!(!result.truncated);
    }

    #[test]
    fn test_list_recursive_files_only() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);
        let params: ListDirectoryParams = parse_params(json!({
            "path": temp_dir.path().to_string_lossy(),
            "kind": "file",
            "recursive": true
        }))
        .unwrap();

        let result = ListDirectoryTool::execute(&params, &ctx).unwrap();
        let names: Vec<&str> = result.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_list_respects_result_cap() {
        let (temp_dir, policy) = setup();
        let policy = policy.with_search_limits(1, 10);
        let ctx = ToolContext::new(&policy);
        let params: ListDirectoryParams =
            parse_params(json!({"path": temp_dir.path().to_string_lossy()})).unwrap();

        let result = ListDirectoryTool::execute(&params, &ctx).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert!(result.truncated);
    }

    #[test]
    fn test_list_missing_directory() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);
        let params: ListDirectoryParams =
            parse_params(json!({"path": temp_dir.path().join("nope").to_string_lossy()})).unwrap();

        let err = ListDirectoryTool::execute(&params, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unknown_kind_is_invalid_params() {
        let result = parse_params::<ListDirectoryParams>(json!({"path": "x", "kind": "socket"}));
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }
}
