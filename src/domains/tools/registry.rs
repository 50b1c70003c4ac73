//! Tool Registry - the static table of dispatchable methods.
//!
//! Each method is described once, by its definition file, as a
//! [`MethodSpec`]. The table is turned into a lookup map when the
//! dispatcher starts; nothing is resolved by reflection at call time.

use std::collections::HashMap;

use rmcp::model::Tool;
use serde_json::Value;

use super::ToolContext;
use super::ToolError;
use super::definitions::{
    CopyDirectoryTool, CopyFileTool, CreateDirectoryTool, DeleteFileTool, EditFileTool,
    GetFileInfoTool, ListAllowedPathsTool, ListDirectoryTool, MoveFileTool, ReadFileTool,
    SearchFilesTool, WriteFileTool,
};
use crate::core::security::Intent;

/// Signature shared by every method handler.
pub type Handler = fn(&ToolContext<'_>, Value) -> Result<Value, ToolError>;

/// Descriptor of one dispatchable method.
#[derive(Clone, Copy)]
pub struct MethodSpec {
    pub name: &'static str,
    /// Intents the method authorizes its paths for.
    pub intents: &'static [Intent],
    /// Names of the path-bearing parameters.
    pub path_params: &'static [&'static str],
    pub handler: Handler,
    /// MCP tool metadata (name, description, schemas).
    pub tool: fn() -> Tool,
}

impl MethodSpec {
    /// Raw path parameters present in `params`, in declaration order.
    pub fn requested_paths(&self, params: &Value) -> Vec<String> {
        self.path_params
            .iter()
            .filter_map(|name| params.get(*name)?.as_str().map(String::from))
            .collect()
    }
}

impl std::fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("intents", &self.intents)
            .finish()
    }
}

/// Every method the server exposes.
pub const METHODS: &[MethodSpec] = &[
    ReadFileTool::SPEC,
    WriteFileTool::SPEC,
    EditFileTool::SPEC,
    ListDirectoryTool::SPEC,
    CreateDirectoryTool::SPEC,
    MoveFileTool::SPEC,
    CopyFileTool::SPEC,
    CopyDirectoryTool::SPEC,
    DeleteFileTool::SPEC,
    SearchFilesTool::SPEC,
    GetFileInfoTool::SPEC,
    ListAllowedPathsTool::SPEC,
];

/// Tool registry - method lookup by name.
#[derive(Debug)]
pub struct ToolRegistry {
    methods: HashMap<&'static str, MethodSpec>,
}

impl ToolRegistry {
    /// Build the lookup map from [`METHODS`].
    pub fn new() -> Self {
        Self {
            methods: METHODS.iter().map(|spec| (spec.name, *spec)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    /// Get all method names, sorted.
    pub fn tool_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.methods.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get all tools as Tool models (metadata), in registration order.
    pub fn get_all_tools() -> Vec<Tool> {
        METHODS.iter().map(|spec| (spec.tool)()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_tool_names() {
        let registry = ToolRegistry::new();
        let names = registry.tool_names();
        assert_eq!(names.len(), METHODS.len());
        for expected in [
            "read_file",
            "write_file",
            "edit_file",
            "list_directory",
            "create_directory",
            "move_file",
            "copy_file",
            "copy_directory",
            "delete_file",
            "search_files",
            "get_file_info",
            "list_allowed_paths",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_tools_match_specs() {
        let tools = ToolRegistry::get_all_tools();
        assert_eq!(tools.len(), METHODS.len());
        for (tool, spec) in tools.iter().zip(METHODS) {
            assert_eq!(tool.name.as_ref(), spec.name);
            assert!(tool.description.is_some());
        }
    }

    #[test]
    fn test_requested_paths() {
        let registry = ToolRegistry::new();
        let spec = registry.get("move_file").unwrap();
        let paths = spec.requested_paths(&json!({"source": "a", "destination": "b"}));
        assert_eq!(paths, vec!["a", "b"]);
        assert!(registry.get("foo_bar").is_none());
    }
}
