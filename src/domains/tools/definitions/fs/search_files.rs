//! Search files tool definition.
//!
//! The search is lazy: the walk stops as soon as one match past the
//! requested count has been seen, so `truncated` costs one extra step.

use rmcp::handler::server::tool::schema_for_type;
use rmcp::model::Tool;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use crate::core::security::Intent;
use crate::domains::fs::{self, SearchMatch, SearchQuery};
use crate::domains::tools::definitions::common::{parse_params, to_result};
use crate::domains::tools::registry::MethodSpec;
use crate::domains::tools::{ToolContext, ToolError};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the search files tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    /// Directory to search under.
    pub root: String,

    /// Glob (`*.md`) or case-insensitive substring matched against names.
    pub pattern: String,

    /// Maximum number of matches. Clamped to the server limit.
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Maximum directory depth. Clamped to the server limit.
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Also match files whose text contains `pattern`.
    #[serde(default)]
    pub content: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SearchFilesResult {
    pub root: String,
    pub pattern: String,
    pub matches: Vec<SearchMatch>,
    /// True when more matches exist than were returned.
    pub truncated: bool,
}

// ============================================================================
// Tool Definition
// ============================================================================

pub struct SearchFilesTool;

impl SearchFilesTool {
    pub const NAME: &'static str = "search_files";

    pub const DESCRIPTION: &'static str = "Recursively search a directory for entries whose name matches a glob or contains a substring (case-insensitive). With content: true, also match text files containing the pattern. Paths are returned relative to the root. Symbolic links are not followed.";

    pub const SPEC: MethodSpec = MethodSpec {
        name: Self::NAME,
        intents: &[Intent::List],
        path_params: &["root"],
        handler: Self::handle,
        tool: Self::to_tool,
    };

    #[instrument(skip_all, fields(root = %params.root, pattern = %params.pattern))]
    pub fn execute(params: &SearchFilesParams, ctx: &ToolContext<'_>) -> Result<SearchFilesResult, ToolError> {
        info!("Search files tool called");
        if params.pattern.is_empty() {
            return Err(ToolError::invalid_params("pattern must not be empty"));
        }

        let policy = ctx.policy();
        let limit = clamp(params.max_results, policy.search_max_results());
        let query = SearchQuery {
            pattern: params.pattern.clone(),
            content: params.content,
            max_depth: clamp(params.max_depth, policy.search_max_depth()),
            max_file_size: policy.max_file_size(),
        };

        let root = ctx.authorize(&params.root, Intent::List)?;
        let mut results = fs::search(&root, query).map_err(ToolError::at(&params.root))?;

        let matches: Vec<SearchMatch> = results.by_ref().take(limit).collect();
        let truncated = results.next().is_some();
        info!("Found {} matches (truncated: {})", matches.len(), truncated);

        Ok(SearchFilesResult {
            root: params.root.clone(),
            pattern: params.pattern.clone(),
            matches,
            truncated,
        })
    }

    fn handle(ctx: &ToolContext<'_>, args: Value) -> Result<Value, ToolError> {
        let params: SearchFilesParams = parse_params(args)?;
        to_result(&Self::execute(&params, ctx)?)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<SearchFilesParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<SearchFilesResult>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Requested value, bounded to `1..=cap`.
fn clamp(requested: Option<usize>, cap: usize) -> usize {
    requested.unwrap_or(cap).clamp(1, cap.max(1))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::protocol::ErrorKind;
    use crate::core::security::SecurityPolicy;
    use crate::domains::fs::MatchSource;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SecurityPolicy) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        stdfs::create_dir_all(root.join("notes/old")).unwrap();
        stdfs::write(root.join("notes/todo.md"), "buy milk").unwrap();
        stdfs::write(root.join("notes/old/done.md"), "paid rent").unwrap();
        stdfs::write(root.join("readme.txt"), "see notes").unwrap();
        let policy =
            SecurityPolicy::new(vec![root.to_path_buf()], 1024, Vec::<String>::new()).unwrap();
        (temp_dir, policy)
    }

    fn params(dir: &TempDir, pattern: &str) -> SearchFilesParams {
        SearchFilesParams {
            root: dir.path().to_string_lossy().into(),
            pattern: pattern.into(),
            max_results: None,
            max_depth: None,
            content: false,
        }
    }

    #[test]
    fn test_glob_search() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);

        let result = SearchFilesTool::execute(&params(&temp_dir, "*.md"), &ctx).unwrap();
        let paths: Vec<&str> = result.matches.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["notes/old/done.md", "notes/todo.md"]);
        assert!(!result.truncated);
    }

    #[test]
    fn test_max_results_truncates() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);

        let mut p = params(&temp_dir, "*.md");
        p.max_results = Some(1);
        let result = SearchFilesTool::execute(&p, &ctx).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert!(result.truncated);
    }

    #[test]
    fn test_depth_limit() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);

        let mut p = params(&temp_dir, "*.md");
        p.max_depth = Some(2);
        let result = SearchFilesTool::execute(&p, &ctx).unwrap();
        let paths: Vec<&str> = result.matches.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["notes/todo.md"]);
    }

    #[test]
    fn test_content_search() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);

        let mut p = params(&temp_dir, "rent");
        p.content = true;
        let result = SearchFilesTool::execute(&p, &ctx).unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].path, "notes/old/done.md");
        assert_eq!(result.matches[0].matched_on, MatchSource::Content);
    }

    #[test]
    fn test_search_root_must_be_directory() {
        let (temp_dir, policy) = setup();
        let ctx = ToolContext::new(&policy);

        let mut p = params(&temp_dir, "x");
        p.root = temp_dir.path().join("readme.txt").to_string_lossy().into();
        let err = SearchFilesTool::execute(&p, &ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(None, 50), 50);
        assert_eq!(clamp(Some(5000), 50), 50);
        assert_eq!(clamp(Some(0), 50), 1);
        assert_eq!(clamp(Some(7), 50), 7);
    }
}
