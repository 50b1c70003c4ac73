//! Server handler and request lifecycle.
//!
//! [`FsServer`] turns one line of JSON-RPC into at most one response. It
//! answers the MCP handshake (`initialize`, `ping`, `tools/list`,
//! `tools/call`) itself and hands every other method name straight to the
//! [`Dispatcher`], so the filesystem methods can be called directly or as
//! MCP tools.
//!
//! Requests are processed one at a time for the whole process: every
//! transport goes through [`FsServer::handle_line`], which holds a shared
//! lock while the request runs on the blocking pool.

use std::sync::Arc;

use rmcp::model::{
    CallToolResult, Content, Implementation, ListToolsResult, ServerCapabilities, ServerInfo,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::config::Config;
use super::error::Result;
use super::protocol::{self, ErrorKind, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use super::security::{AuditLog, SecurityPolicy};
use crate::domains::tools::{Dispatcher, ToolError, ToolRegistry};

const INSTRUCTIONS: &str = "Sandboxed filesystem server. Every path must lie inside one of the \
    allowed directories (see list_allowed_paths). Symbolic links are resolved before the check. \
    Writes are atomic and subject to the configured size and extension limits.";

/// Parameters of a `tools/call` request.
#[derive(Debug, Deserialize)]
struct ToolCall {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// The main server handler.
///
/// Cheap to clone; clones share the dispatcher and the request lock.
#[derive(Clone)]
pub struct FsServer {
    config: Arc<Config>,
    dispatcher: Arc<Dispatcher>,
    worker: Arc<Mutex<()>>,
}

impl FsServer {
    /// Build the policy, open the audit log if enabled, and create the server.
    pub fn new(config: Config) -> Result<Self> {
        let policy = SecurityPolicy::from_config(&config.security)?;

        let mut dispatcher = Dispatcher::new(policy);
        if config.security.enable_audit_log {
            dispatcher = dispatcher.with_audit_log(AuditLog::open(&config.security.audit_log_path)?);
        }

        Ok(Self::with_dispatcher(config, dispatcher))
    }

    /// Create a server around an existing dispatcher.
    pub fn with_dispatcher(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            worker: Arc::new(Mutex::new(())),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Process one framed message.
    ///
    /// Waits for any request already in flight, then runs this one on the
    /// blocking pool. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let _turn = self.worker.lock().await;

        let server = self.clone();
        let line = line.to_owned();
        match tokio::task::spawn_blocking(move || server.process_line(&line)).await {
            Ok(response) => response,
            Err(e) => {
                error!("Request worker failed: {}", e);
                Some(JsonRpcResponse::failure(
                    Value::Null,
                    JsonRpcError::new(ErrorKind::IoError, "Internal error while handling the request"),
                ))
            }
        }
    }

    /// Decode and handle one line synchronously.
    pub fn process_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match protocol::decode_line(line) {
            Ok(request) => self.handle_request(request),
            Err(e) => {
                warn!("Rejected message: {}", e.error.message);
                Some(e.into_response())
            }
        }
    }

    /// Handle a decoded request.
    #[instrument(skip_all, fields(method = %request.method))]
    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.response_id();
        let notification = request.is_notification();

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params),
            method if method.starts_with("notifications/") => {
                debug!("Received notification: {}", method);
                return None;
            }
            method => self
                .dispatcher
                .dispatch(method, request.params)
                .map_err(|e| e.to_rpc_error()),
        };

        if notification {
            return None;
        }
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::failure(id, error),
        })
    }

    fn initialize(&self) -> std::result::Result<Value, JsonRpcError> {
        info!("Processing initialize request");
        let info = ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.name().to_string(),
                version: self.version().to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        };
        to_value(&info)
    }

    fn list_tools(&self) -> std::result::Result<Value, JsonRpcError> {
        to_value(&ListToolsResult {
            tools: ToolRegistry::get_all_tools(),
            next_cursor: None,
            meta: None,
        })
    }

    /// Run a method as an MCP tool.
    ///
    /// Tool failures become a result with `isError: true`; only an unknown
    /// tool or a malformed call is a protocol error.
    fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let call: ToolCall = serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|e| {
            JsonRpcError::new(ErrorKind::InvalidParams, format!("Invalid tools/call params: {e}"))
        })?;
        info!("Calling tool: {}", call.name);

        let result = match self.dispatcher.dispatch(&call.name, call.arguments) {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value).unwrap_or_default();
                CallToolResult {
                    content: vec![Content::text(text)],
                    structured_content: Some(value),
                    is_error: Some(false),
                    meta: None,
                }
            }
            Err(e @ ToolError::MethodNotFound(_)) => return Err(e.to_rpc_error()),
            Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
        };
        to_value(&result)
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| {
        error!("Failed to serialize response: {}", e);
        JsonRpcError::new(ErrorKind::IoError, "Internal error while handling the request")
    })
}
